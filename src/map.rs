//! Turning the model's free-text reply into a per-country bias map.
//!
//! Extraction is best-effort: the reply is searched for a fenced JSON block,
//! then for the outermost braces, and anything that does not parse yields no
//! entries. Countries missing from [`COUNTRY_COORDS`] are dropped.

use colored::{ColoredString, Colorize};
use lazy_static::lazy_static;
use prettytable::{format, Cell, Row, Table};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::TARGET_LLM_REQUEST;

pub const MAP_TITLE: &str = "Fairness/Bias of News Coverage by Country";

/// Country name to (latitude, longitude).
pub const COUNTRY_COORDS: &[(&str, (f64, f64))] = &[
    ("France", (46.603354, 1.888334)),
    ("United States", (37.09024, -95.712891)),
    ("USA", (37.09024, -95.712891)),
    ("Japan", (36.204824, 138.252924)),
    ("China", (35.86166, 104.195397)),
    ("India", (20.593684, 78.96288)),
    ("United Kingdom", (55.378051, -3.435973)),
    ("Germany", (51.165691, 10.451526)),
    ("Australia", (-25.274398, 133.775136)),
    ("Russia", (61.52401, 105.318756)),
];

lazy_static! {
    static ref JSON_CODE_BLOCK: Regex = Regex::new(r"(?s)```json(.*?)```").unwrap();
    static ref PARENTHESIZED: Regex = Regex::new(r"\(([^)]+)\)").unwrap();
}

/// The label the model assigned to an outlet. Labels outside the requested
/// set, including empty and non-string values, are kept verbatim in `Other`.
/// Only a missing label is `None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum BiasLevel {
    Neutral,
    SlightlyNegative,
    ExtremeBias,
    #[default]
    None,
    Other(String),
}

impl BiasLevel {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Neutral" => BiasLevel::Neutral,
            "Slightly Negative" => BiasLevel::SlightlyNegative,
            "Extreme Bias (Distraction)" => BiasLevel::ExtremeBias,
            "None" => BiasLevel::None,
            other => BiasLevel::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BiasLevel::Neutral => "Neutral",
            BiasLevel::SlightlyNegative => "Slightly Negative",
            BiasLevel::ExtremeBias => "Extreme Bias (Distraction)",
            BiasLevel::None => "None",
            BiasLevel::Other(label) => label,
        }
    }

    /// Marker colour name; unknown labels are drawn black.
    pub fn color(&self) -> &'static str {
        match self {
            BiasLevel::Neutral => "green",
            BiasLevel::SlightlyNegative => "orange",
            BiasLevel::ExtremeBias => "red",
            BiasLevel::None => "gray",
            BiasLevel::Other(_) => "black",
        }
    }

    /// The levels shown in the legend, in order.
    pub fn legend() -> [BiasLevel; 4] {
        [
            BiasLevel::Neutral,
            BiasLevel::SlightlyNegative,
            BiasLevel::ExtremeBias,
            BiasLevel::None,
        ]
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self {
            BiasLevel::Neutral => text.green(),
            BiasLevel::SlightlyNegative => text.truecolor(255, 165, 0),
            BiasLevel::ExtremeBias => text.red(),
            BiasLevel::None => text.bright_black(),
            BiasLevel::Other(_) => text.normal(),
        }
    }
}

impl fmt::Display for BiasLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for BiasLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for BiasLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A present but unusable value (null, numbers) is an unknown label.
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(label) => BiasLevel::from_label(&label),
            Value::Null => BiasLevel::Other(String::new()),
            other => BiasLevel::Other(other.to_string()),
        })
    }
}

/// One entry of the `articles` array the model was asked to return.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutletAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub newsoutlet: String,
    #[serde(deserialize_with = "lenient_string")]
    pub newsanalysis: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country_of_origin: String,
    pub bias_level: BiasLevel,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A country placed on the map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapMarker {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bias: BiasLevel,
    pub color: &'static str,
}

/// Locates the JSON object in a model reply and returns its `articles`
/// entries. Returns an empty list whenever nothing usable is found.
pub fn extract_outlet_analysis(llm_response: &str) -> Vec<OutletAnalysis> {
    let Some(json_str) = locate_json(llm_response) else {
        debug!(target: TARGET_LLM_REQUEST, "No JSON object found in LLM response");
        return Vec::new();
    };

    let data: Value = match serde_json::from_str(json_str) {
        Ok(data) => data,
        Err(e) => {
            warn!(target: TARGET_LLM_REQUEST, "Error parsing outlet analysis: {}", e);
            return Vec::new();
        }
    };

    match data.get("articles") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter(|entry| entry.is_object())
            .filter_map(|entry| OutletAnalysis::deserialize(entry).ok())
            .collect(),
        Some(_) => {
            warn!(target: TARGET_LLM_REQUEST, "\"articles\" in LLM response is not a list");
            Vec::new()
        }
        None => {
            debug!(target: TARGET_LLM_REQUEST, "LLM response JSON has no \"articles\" key");
            Vec::new()
        }
    }
}

fn locate_json(text: &str) -> Option<&str> {
    if let Some(captures) = JSON_CODE_BLOCK.captures(text) {
        return captures.get(1).map(|m| m.as_str().trim());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// "Outlet Name (Country)" yields "Country"; anything else is returned as is.
pub fn country_from_outlet(newsoutlet: &str) -> &str {
    PARENTHESIZED
        .captures(newsoutlet)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(newsoutlet)
}

pub fn country_coords(country: &str) -> Option<(f64, f64)> {
    COUNTRY_COORDS
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, coords)| *coords)
}

/// One marker per known country, in the order countries first appear. The
/// first entry for a country decides its bias.
pub fn plot_markers(analysis: &[OutletAnalysis]) -> Vec<MapMarker> {
    let mut plotted = HashSet::new();
    let mut markers = Vec::new();

    for entry in analysis {
        let country = country_from_outlet(&entry.country_of_origin);
        debug!("country is {}", country);

        let Some((latitude, longitude)) = country_coords(country) else {
            continue;
        };
        if !plotted.insert(country.to_string()) {
            continue;
        }

        markers.push(MapMarker {
            country: country.to_string(),
            latitude,
            longitude,
            color: entry.bias_level.color(),
            bias: entry.bias_level.clone(),
        });
    }

    markers
}

/// Renders markers as a terminal table followed by the legend.
pub fn render_map(markers: &[MapMarker]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Country"),
        Cell::new("Lat"),
        Cell::new("Lon"),
        Cell::new("Bias Level"),
    ]));

    for marker in markers {
        table.add_row(Row::new(vec![
            Cell::new(&marker.bias.paint(&format!("● {}", marker.country)).to_string()),
            Cell::new(&format!("{:.2}", marker.latitude)),
            Cell::new(&format!("{:.2}", marker.longitude)),
            Cell::new(&marker.bias.paint(marker.bias.label()).to_string()),
        ]));
    }

    let legend = BiasLevel::legend()
        .iter()
        .map(|level| level.paint(&format!("● {}", level.label())).to_string())
        .collect::<Vec<_>>()
        .join("  ");

    format!(
        "{}\n{}{}: {}\n",
        MAP_TITLE.bold(),
        table,
        "Bias Level".bold(),
        legend
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(country: &str, bias: &str) -> OutletAnalysis {
        OutletAnalysis {
            newsoutlet: format!("Outlet in {}", country),
            newsanalysis: String::new(),
            country_of_origin: country.to_string(),
            bias_level: BiasLevel::from_label(bias),
        }
    }

    #[test]
    fn test_extract_from_fenced_block() {
        let response = r#"Here is my analysis.
```json
{
  "summary": "Mixed coverage.",
  "articles": [
    {"newsoutlet": "CNN", "newsanalysis": "Balanced.", "country_of_origin": "USA", "bias_level": "Neutral"},
    {"newsoutlet": "RT", "newsanalysis": "Loaded terms.", "country_of_origin": "Russia", "bias_level": "Extreme Bias (Distraction)"}
  ]
}
```
Let me know if you need more."#;
        let analysis = extract_outlet_analysis(response);
        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis[0].newsoutlet, "CNN");
        assert_eq!(analysis[0].bias_level, BiasLevel::Neutral);
        assert_eq!(analysis[1].country_of_origin, "Russia");
        assert_eq!(analysis[1].bias_level, BiasLevel::ExtremeBias);
    }

    #[test]
    fn test_extract_from_braces() {
        let response = r#"Sure! {"summary": "ok", "articles": [{"newsoutlet": "NDTV", "country_of_origin": "India", "bias_level": "Slightly Negative"}]} Thanks."#;
        let analysis = extract_outlet_analysis(response);
        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis[0].bias_level, BiasLevel::SlightlyNegative);
        assert_eq!(analysis[0].newsanalysis, "");
    }

    #[test]
    fn test_extract_without_json() {
        assert!(extract_outlet_analysis("The coverage was broadly neutral.").is_empty());
        assert!(extract_outlet_analysis("").is_empty());
        assert!(extract_outlet_analysis("closing brace only }").is_empty());
        assert!(extract_outlet_analysis("} reversed {").is_empty());
        assert!(extract_outlet_analysis("{ not json at all }").is_empty());
        assert!(extract_outlet_analysis(r#"{"summary": "no list"}"#).is_empty());
        assert!(extract_outlet_analysis(r#"{"articles": "nope"}"#).is_empty());
    }

    #[test]
    fn test_extract_is_permissive() {
        let response = r#"{"articles": [
            {"newsoutlet": "Fox News", "country_of_origin": "USA", "bias_level": "Very Biased"},
            "stray string",
            {"newsoutlet": 42, "country_of_origin": null, "bias_level": null}
        ]}"#;
        let analysis = extract_outlet_analysis(response);
        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis[0].bias_level, BiasLevel::Other("Very Biased".to_string()));
        assert_eq!(analysis[0].bias_level.color(), "black");
        assert_eq!(analysis[1].newsoutlet, "42");
        assert_eq!(analysis[1].country_of_origin, "");
        assert_eq!(analysis[1].bias_level, BiasLevel::Other(String::new()));
        assert_eq!(analysis[1].bias_level.color(), "black");
    }

    #[test]
    fn test_only_missing_bias_is_gray() {
        let response = r#"{"articles": [
            {"country_of_origin": "USA", "bias_level": null},
            {"country_of_origin": "Japan", "bias_level": ""},
            {"country_of_origin": "France", "bias_level": " Neutral "},
            {"country_of_origin": "China"}
        ]}"#;
        let markers = plot_markers(&extract_outlet_analysis(response));
        let colors: Vec<(&str, &str)> = markers.iter().map(|m| (m.country.as_str(), m.color)).collect();
        assert_eq!(
            colors,
            vec![("USA", "black"), ("Japan", "black"), ("France", "black"), ("China", "gray")]
        );
    }

    #[test]
    fn test_country_from_outlet() {
        assert_eq!(country_from_outlet("BBC News (United Kingdom)"), "United Kingdom");
        assert_eq!(country_from_outlet("ABC News (Australia) (Sydney)"), "Australia");
        assert_eq!(country_from_outlet("Japan"), "Japan");
        assert_eq!(country_from_outlet(""), "");
    }

    #[test]
    fn test_bias_colors() {
        assert_eq!(BiasLevel::Neutral.color(), "green");
        assert_eq!(BiasLevel::SlightlyNegative.color(), "orange");
        assert_eq!(BiasLevel::ExtremeBias.color(), "red");
        assert_eq!(BiasLevel::None.color(), "gray");
        assert_eq!(BiasLevel::from_label("None"), BiasLevel::None);
        assert_eq!(BiasLevel::from_label(" Neutral "), BiasLevel::Other(" Neutral ".to_string()));
    }

    #[test]
    fn test_markers_skip_unknown_countries() {
        let markers = plot_markers(&[entry("Qatar", "Neutral"), entry("UK", "Neutral"), entry("Japan", "Neutral")]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].country, "Japan");
        assert_eq!(markers[0].latitude, 36.204824);
        assert_eq!(markers[0].longitude, 138.252924);
    }

    #[test]
    fn test_markers_never_repeat_a_country() {
        let markers = plot_markers(&[
            entry("USA", "Neutral"),
            entry("Reuters (Germany)", "Slightly Negative"),
            entry("USA", "Extreme Bias (Distraction)"),
            entry("Germany", "Neutral"),
        ]);
        let countries: Vec<&str> = markers.iter().map(|m| m.country.as_str()).collect();
        assert_eq!(countries, vec!["USA", "Germany"]);
        assert_eq!(markers[0].bias, BiasLevel::Neutral);
        assert_eq!(markers[0].color, "green");
        assert_eq!(markers[1].color, "orange");
    }

    #[test]
    fn test_markers_only_from_coordinate_table() {
        let entries: Vec<OutletAnalysis> = ["France", "Atlantis", "China", "Qatar", "Russia", "russia"]
            .iter()
            .map(|c| entry(c, "Neutral"))
            .collect();
        for marker in plot_markers(&entries) {
            assert!(country_coords(&marker.country).is_some());
        }
        assert_eq!(plot_markers(&entries).len(), 3);
    }

    #[test]
    fn test_render_map() {
        colored::control::set_override(false);
        let rendered = render_map(&plot_markers(&[entry("India", "Neutral"), entry("China", "Extreme Bias (Distraction)")]));
        assert!(rendered.starts_with(MAP_TITLE));
        assert!(rendered.contains("● India"));
        assert!(rendered.contains("Extreme Bias (Distraction)"));
        assert!(rendered.contains("20.59"));
        assert!(rendered.contains("● Slightly Negative"));
    }
}
