//! Color-heuristic mood classifier
//!
//! Averages every pixel to one RGB color, converts it to HSV and buckets it:
//!
//! | condition                          | theme    |
//! |------------------------------------|----------|
//! | s < 0.2 and v > 0.75               | Serenity |
//! | 0.5 ≤ h ≤ 0.7 and v < 0.5          | Sad      |
//! | 0.5 ≤ h ≤ 0.7 otherwise            | Calm     |
//! | 0.12 < h < 0.18 and v > 0.2        | Joy      |
//! | anything else                      | Neutral  |
//!
//! Rules are checked top to bottom; hue is in turns (0.0 to 1.0).

use async_trait::async_trait;
use socialspark_core::domain::MoodTheme;
use socialspark_core::port::{InferenceError, MoodClassifier, MoodRequest};
use tracing::debug;

/// Hue, saturation and value, each in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let v = max;
        if max == min {
            return Self { h: 0.0, s: 0.0, v };
        }

        let delta = max - min;
        let s = delta / max;
        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;
        let h = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        Self {
            h: (h / 6.0).rem_euclid(1.0),
            s,
            v,
        }
    }
}

pub fn classify_hsv(hsv: Hsv) -> MoodTheme {
    let Hsv { h, s, v } = hsv;
    if s < 0.2 && v > 0.75 {
        MoodTheme::Serenity
    } else if (0.5..=0.7).contains(&h) {
        if v < 0.5 {
            MoodTheme::Sad
        } else {
            MoodTheme::Calm
        }
    } else if h > 0.12 && h < 0.18 && v > 0.2 {
        MoodTheme::Joy
    } else {
        MoodTheme::Neutral
    }
}

fn average_hsv(bytes: &[u8]) -> Result<Hsv, InferenceError> {
    let rgb = image::load_from_memory(bytes)
        .map_err(|e| InferenceError::rejected(format!("cannot decode image: {}", e)))?
        .to_rgb8();

    let pixels = u64::from(rgb.width()) * u64::from(rgb.height());
    if pixels == 0 {
        return Err(InferenceError::rejected("image has no pixels"));
    }

    let mut sums = [0u64; 3];
    for pixel in rgb.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }

    let mean = |sum: u64| sum as f64 / pixels as f64 / 255.0;
    Ok(Hsv::from_rgb(mean(sums[0]), mean(sums[1]), mean(sums[2])))
}

/// MoodClassifier backed by [`classify_hsv`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMoodClassifier;

impl HeuristicMoodClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MoodClassifier for HeuristicMoodClassifier {
    async fn classify_mood(&self, request: MoodRequest<'_>) -> Result<String, InferenceError> {
        let bytes = request.image.bytes().to_vec();

        // Decoding a 10MB image is CPU-bound
        let hsv = tokio::task::spawn_blocking(move || average_hsv(&bytes))
            .await
            .map_err(|e| InferenceError::rejected(format!("mood analysis task failed: {}", e)))??;

        let theme = classify_hsv(hsv);
        debug!(h = hsv.h, s = hsv.s, v = hsv.v, theme = %theme, "Heuristic mood classified");
        Ok(theme.as_str().to_string())
    }
}
