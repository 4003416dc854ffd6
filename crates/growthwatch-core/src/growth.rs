use serde::{Deserialize, Serialize};

/// Category of a growth signal. The set is closed; labels that do not map to a
/// variant carry no tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthType {
    Awards,
    Expansion,
    NewHires,
    Partnerships,
    Patents,
    Funding,
    ProductLaunch,
    MarketExpansion,
    ClientAcquisition,
}

impl GrowthType {
    pub const ALL: [GrowthType; 9] = [
        GrowthType::Awards,
        GrowthType::Expansion,
        GrowthType::NewHires,
        GrowthType::Partnerships,
        GrowthType::Patents,
        GrowthType::Funding,
        GrowthType::ProductLaunch,
        GrowthType::MarketExpansion,
        GrowthType::ClientAcquisition,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GrowthType::Awards => "awards",
            GrowthType::Expansion => "expansion",
            GrowthType::NewHires => "new_hires",
            GrowthType::Partnerships => "partnerships",
            GrowthType::Patents => "patents",
            GrowthType::Funding => "funding",
            GrowthType::ProductLaunch => "product_launch",
            GrowthType::MarketExpansion => "market_expansion",
            GrowthType::ClientAcquisition => "client_acquisition",
        }
    }

    /// Map a free-text label (as produced by search or LLM collaborators) onto
    /// the closed set.
    ///
    /// Case, spacing, hyphens and simple plurals are ignored, and a handful of
    /// synonyms the models commonly emit are accepted ("financial success",
    /// "recognition", "team growth", ...).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        let found = match key.as_str() {
            "award" | "awards" | "recognition" | "award_recognition" | "awards_recognition" => {
                GrowthType::Awards
            }
            "expansion" | "business_expansion" | "growth" | "office_expansion" => {
                GrowthType::Expansion
            }
            "new_hire" | "new_hires" | "hiring" | "team_growth" | "new_hires_team_growth" => {
                GrowthType::NewHires
            }
            "partnership" | "partnerships" | "collaboration" | "collaborations"
            | "partnerships_collaborations" => GrowthType::Partnerships,
            "patent" | "patents" | "innovation" | "patents_innovations" => GrowthType::Patents,
            "funding" | "investment" | "financial_success" | "financial_success_funding"
            | "capital_raise" => GrowthType::Funding,
            "product_launch" | "product_launches" | "product_update" | "major_update"
            | "product_launch_major_update" => GrowthType::ProductLaunch,
            "market_expansion" | "new_market" | "international_expansion" => {
                GrowthType::MarketExpansion
            }
            "client_acquisition" | "client_acquisitions" | "new_client" | "new_clients"
            | "customer_win" | "customer_acquisition" => GrowthType::ClientAcquisition,
            _ => return None,
        };
        Some(found)
    }
}

impl std::fmt::Display for GrowthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
