// Theme Applier
// Owns the presentation context and is the only writer of its color variables.

use crate::domain::{palette_for, MoodTheme, PALETTE_KEYS};
use crate::port::PresentationContext;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Applies mood palettes to a presentation context
pub struct ThemeApplier {
    context: Box<dyn PresentationContext>,
    /// Theme whose variables are currently rendered
    current: Option<MoodTheme>,
    /// Last theme applied; survives the auto-theme toggle
    remembered: Option<MoodTheme>,
    auto_theme: bool,
}

impl ThemeApplier {
    pub fn new(context: Box<dyn PresentationContext>, auto_theme: bool) -> Self {
        Self {
            context,
            current: None,
            remembered: None,
            auto_theme,
        }
    }

    /// Apply a theme, or clear every palette variable with `None`
    ///
    /// Both directions are idempotent: applying the same theme twice, or
    /// clearing twice, leaves the same visible state.
    pub fn apply(&mut self, theme: Option<MoodTheme>) {
        match theme {
            Some(theme) => {
                self.render(theme);
                self.remembered = Some(theme);
            }
            None => {
                self.clear_rendered();
                self.remembered = None;
            }
        }
    }

    /// Apply by raw name; unknown names clear like `apply(None)`
    pub fn apply_named(&mut self, name: Option<&str>) {
        let theme = name.and_then(|n| match n.parse::<MoodTheme>() {
            Ok(theme) => Some(theme),
            Err(e) => {
                warn!(error = %e, "Unknown theme name, clearing theme");
                None
            }
        });
        self.apply(theme);
    }

    /// Theme produced by a completed job
    ///
    /// Rendered only while auto-theme is on; otherwise remembered for the
    /// next time it is switched on.
    pub fn offer(&mut self, theme: MoodTheme) {
        if self.auto_theme {
            self.apply(Some(theme));
        } else {
            info!(theme = %theme, "Auto-theme off, remembering theme without rendering");
            self.remembered = Some(theme);
        }
    }

    /// Toggle auto-theme: off clears the rendering, on re-applies the remembered theme
    pub fn set_auto_theme(&mut self, enabled: bool) {
        self.auto_theme = enabled;
        if enabled {
            if let Some(theme) = self.remembered {
                self.render(theme);
            }
        } else {
            self.clear_rendered();
        }
    }

    pub fn auto_theme(&self) -> bool {
        self.auto_theme
    }

    pub fn current(&self) -> Option<MoodTheme> {
        self.current
    }

    pub fn remembered(&self) -> Option<MoodTheme> {
        self.remembered
    }

    /// Variables currently assigned in the presentation context
    pub fn variables(&self) -> BTreeMap<String, String> {
        self.context.snapshot()
    }

    fn render(&mut self, theme: MoodTheme) {
        for (key, value) in palette_for(theme).variables() {
            self.context.set_variable(key, value);
        }
        self.current = Some(theme);
        info!(theme = %theme, "Theme applied");
    }

    // Removes the full schema key set, not just what looks set right now
    fn clear_rendered(&mut self) {
        for key in PALETTE_KEYS {
            self.context.remove_variable(key);
        }
        self.current = None;
    }
}
