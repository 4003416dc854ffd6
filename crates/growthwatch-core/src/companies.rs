use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One company to research. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyTarget {
    pub name: String,
    pub location: String,
    /// Known website domain; when set, search-based identity lookup is skipped.
    #[serde(default)]
    pub domain: Option<String>,
    /// Known LinkedIn company slug (the part after `/company/`).
    #[serde(default)]
    pub linkedin_id: Option<String>,
}

impl CompanyTarget {
    #[must_use]
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            domain: None,
            linkedin_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompaniesFile {
    pub companies: Vec<CompanyTarget>,
}

impl CompaniesFile {
    /// Find a company by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CompanyTarget> {
        let wanted = name.trim().to_lowercase();
        self.companies
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
    }
}

/// Load and validate the companies list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_companies(path: &Path) -> Result<CompaniesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CompaniesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_companies(&content)
}

fn parse_companies(content: &str) -> Result<CompaniesFile, ConfigError> {
    let mut file: CompaniesFile = serde_yaml::from_str(content)?;

    for company in &mut file.companies {
        company.name = company.name.trim().to_string();
        company.location = company.location.trim().to_string();
        company.domain = company
            .domain
            .take()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty());
        company.linkedin_id = company
            .linkedin_id
            .take()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
    }

    validate_companies(&file)?;
    Ok(file)
}

fn validate_companies(file: &CompaniesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for company in &file.companies {
        if company.name.is_empty() {
            return Err(ConfigError::Validation(
                "company name must be non-empty".to_string(),
            ));
        }

        if company.location.is_empty() {
            return Err(ConfigError::Validation(format!(
                "company '{}' has an empty location",
                company.name
            )));
        }

        if !seen.insert(company.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate company name: '{}'",
                company.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_entries() {
        let yaml = r"
companies:
  - name: OnQ Software
    location: Melbourne
  - name: GRC Solutions
    location: Sydney
    domain: ' GRC-Solutions.com '
    linkedin_id: grc-solutions-pty-ltd
";
        let file = parse_companies(yaml).unwrap();
        assert_eq!(file.companies.len(), 2);
        assert_eq!(file.companies[0], CompanyTarget::new("OnQ Software", "Melbourne"));
        assert_eq!(
            file.companies[1].domain.as_deref(),
            Some("grc-solutions.com")
        );
        assert_eq!(
            file.companies[1].linkedin_id.as_deref(),
            Some("grc-solutions-pty-ltd")
        );
    }

    #[test]
    fn blank_hints_become_none() {
        let yaml = r"
companies:
  - name: Partmax
    location: Melbourne
    domain: ''
";
        let file = parse_companies(yaml).unwrap();
        assert!(file.companies[0].domain.is_none());
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        let yaml = r"
companies:
  - name: LAB Group
    location: Melbourne
  - name: lab group
    location: Sydney
";
        let err = parse_companies(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_empty_location() {
        let yaml = r"
companies:
  - name: Smartsoft
    location: '  '
";
        let err = parse_companies(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("Smartsoft")));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = parse_companies("companies: [name: x").unwrap_err();
        assert!(matches!(err, ConfigError::CompaniesFileParse(_)));
    }

    #[test]
    fn find_is_case_insensitive() {
        let yaml = r"
companies:
  - name: Axcelerate
    location: Brisbane
";
        let file = parse_companies(yaml).unwrap();
        assert!(file.find(" axcelerate ").is_some());
        assert!(file.find("iD4me").is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_companies(Path::new("/nonexistent/companies.yaml")).unwrap_err();
        assert!(
            matches!(err, ConfigError::CompaniesFileIo { ref path, .. } if path.contains("nonexistent"))
        );
    }
}
