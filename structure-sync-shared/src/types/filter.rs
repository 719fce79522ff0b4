use serde::{Deserialize, Serialize};

/// Filter specification attached to sources and sinks.
///
/// `internal_name` is the machine-facing identifier derived from the
/// display name when not provided explicitly: lowercased, trimmed,
/// whitespace runs collapsed to underscores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub internal_name: Option<String>,
}

fn default_required() -> bool {
    true
}

impl Filter {
    /// The machine-facing name of this filter.
    pub fn internal_name(&self) -> String {
        match &self.internal_name {
            Some(internal) => internal.clone(),
            None => normalize_filter_name(&self.name),
        }
    }
}

fn normalize_filter_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_name_is_derived_from_name() {
        let filter = Filter {
            name: "Upper Threshold".to_string(),
            filter_type: "free_text".to_string(),
            required: true,
            internal_name: None,
        };
        assert_eq!(filter.internal_name(), "upper_threshold");
    }

    #[test]
    fn provided_internal_name_wins() {
        let filter = Filter {
            name: "Upper Threshold".to_string(),
            filter_type: "free_text".to_string(),
            required: true,
            internal_name: Some("lower_threshold".to_string()),
        };
        assert_eq!(filter.internal_name(), "lower_threshold");
    }

    #[test]
    fn uncommon_whitespace_is_collapsed() {
        let filter = Filter {
            name: "  Min \t  Max ".to_string(),
            filter_type: "free_text".to_string(),
            required: false,
            internal_name: None,
        };
        assert_eq!(filter.internal_name(), "min_max");
    }
}
