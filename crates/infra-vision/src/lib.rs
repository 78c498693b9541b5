// SocialSpark Infrastructure - Vision
// Offline MoodClassifier: no network, decides from the image's average color

pub mod mood_heuristic;

pub use mood_heuristic::{classify_hsv, Hsv, HeuristicMoodClassifier};
