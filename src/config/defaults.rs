//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "Welcome to My Site".into()
    }

    pub fn author() -> String {
        "Your Name".into()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn base_path() -> String {
        String::new()
    }

    pub fn content() -> PathBuf {
        "src/content".into()
    }

    pub fn templates() -> PathBuf {
        "src/templates".into()
    }

    pub fn partials() -> PathBuf {
        "src/partials".into()
    }

    pub fn styles() -> PathBuf {
        "src/styles".into()
    }

    pub fn scripts() -> PathBuf {
        "src/scripts".into()
    }

    pub fn output() -> PathBuf {
        "docs".into()
    }

    pub fn landing() -> PathBuf {
        "src/index.html".into()
    }

    pub mod blog {
        pub fn section() -> String {
            "blog".into()
        }

        pub fn title() -> String {
            "Blog".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }
}
