/// Countries the model must cover in a multi-outlet comparison.
pub const REQUIRED_COUNTRIES: &[&str] = &[
    "France",
    "USA",
    "Japan",
    "China",
    "India",
    "United Kingdom",
    "Germany",
    "Australia",
    "Russia",
];

/// The bias labels the model is asked to choose from.
pub const BIAS_LEVELS: &[&str] = &["Neutral", "Slightly Negative", "Extreme Bias (Distraction)"];

/// Example of the reply shape requested from the model.
pub const JSON_SCHEMA_EXAMPLE: &str = r#"{
  "summary": "string",
  "articles": [
    {
      "newsoutlet": "string",
      "newsanalysis": "string",
      "country_of_origin": "string",
      "bias_level": "Neutral, Slightly Negative, Extreme Bias (Distraction)"
    },
    ...
  ]
}
"#;
