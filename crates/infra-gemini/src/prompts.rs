// Prompt texts and JSON response schemas, one pair per port

use serde::Deserialize;
use serde_json::{json, Value};
use socialspark_core::domain::MoodTheme;

pub fn caption_prompt(description: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are a social media expert. Write one engaging caption for the image.\n\
         Keep it creative and short, no more than 20 words. Emojis are welcome, hashtags are not.\n",
    );
    if let Some(description) = description {
        prompt.push_str(&format!("\nDescription: {}\n", description));
    }
    prompt
}

pub fn caption_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "caption": { "type": "string", "description": "The caption text" }
        },
        "required": ["caption"]
    })
}

#[derive(Debug, Deserialize)]
pub struct CaptionOutput {
    pub caption: String,
}

pub fn hashtags_prompt(description: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are a social media expert. Generate relevant hashtags for the image based on the \
         description and the image itself.\n",
    );
    if let Some(description) = description {
        prompt.push_str(&format!("\nDescription: {}\n", description));
    }
    prompt.push_str(
        "\nReturn single words only. Do not include the # symbol.\n\
         Example output: travel, nature, beautiful, vacation\n",
    );
    prompt
}

pub fn hashtags_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "hashtags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Relevant hashtags for the image, without the # symbol"
            }
        },
        "required": ["hashtags"]
    })
}

#[derive(Debug, Deserialize)]
pub struct HashtagsOutput {
    pub hashtags: Vec<String>,
}

pub const MOOD_PROMPT: &str = "Based on the mood of the image, determine the best theme for the app.\n\
\n\
Here are the possible themes:\n\
- Serenity (pale greens and blues)\n\
- Sad (muted grays and blues)\n\
- Joy (bright yellows and oranges)\n\
- Calm (soft blues and purples)\n\
- Neutral (light grays)\n\
\n\
Analyze the image and return the theme that best matches its mood.";

pub fn mood_schema() -> Value {
    let names: Vec<&str> = MoodTheme::ALL.iter().map(MoodTheme::as_str).collect();
    json!({
        "type": "object",
        "properties": {
            "theme": {
                "type": "string",
                "enum": names,
                "description": "The determined theme based on the mood of the image"
            }
        },
        "required": ["theme"]
    })
}

#[derive(Debug, Deserialize)]
pub struct MoodOutput {
    pub theme: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_is_optional() {
        assert!(!caption_prompt(None).contains("Description:"));
        assert!(hashtags_prompt(Some("beach day")).contains("Description: beach day"));
    }

    #[test]
    fn test_mood_schema_lists_every_theme() {
        let schema = mood_schema();
        let names = schema["properties"]["theme"]["enum"].as_array().unwrap();
        assert_eq!(names.len(), MoodTheme::ALL.len());
        assert!(names.iter().any(|n| n == "Serenity"));
    }
}
