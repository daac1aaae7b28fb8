use serde::{Deserialize, Serialize};

use super::common::{BIAS_LEVELS, JSON_SCHEMA_EXAMPLE, REQUIRED_COUNTRIES};
use crate::rss::Article;

/// Everything the prompt is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub topic: String,
    pub articles: Vec<Article>,
}

impl AnalysisContext {
    pub fn new(topic: &str, articles: Vec<Article>) -> Self {
        Self {
            topic: topic.to_string(),
            articles,
        }
    }
}

/// Builds the instruction for the model. Exactly one article gets the
/// single-article template; any other count gets the comparison template.
pub fn build_prompt(context: &AnalysisContext) -> String {
    match context.articles.as_slice() {
        [article] => single_article_prompt(&context.topic, article),
        articles => coverage_comparison_prompt(&context.topic, articles),
    }
}

fn article_block(article: &Article) -> String {
    format!(
        "Source: {} ({})\nTitle: {}\nSummary: {}\nLink: {}\n\n",
        article.source, article.country, article.title, article.summary, article.link
    )
}

pub fn single_article_prompt(topic: &str, article: &Article) -> String {
    format!(
        "Here is a news article about '{topic}':\n\n\
         {block}\
         Analyze the fairness and any noticeable bias in the article above. \
         Does the language appear neutral or does it favor a particular perspective? \
         Write a short paragraph with your analysis, citing specific phrases or examples.",
        topic = topic,
        block = article_block(article),
    )
}

pub fn coverage_comparison_prompt(topic: &str, articles: &[Article]) -> String {
    let mut prompt = format!(
        "Analyze the following news coverage on '{}' from multiple sources. \
         Assess the fairness, bias, and any missing perspectives. Here are the articles:\n\n",
        topic
    );

    for article in articles {
        prompt.push_str(&article_block(article));
    }

    let bias_levels = BIAS_LEVELS.join(", ");
    prompt.push_str(&format!(
        "Compare the coverage. Write a short paragraph summarizing the overall fairness and any noticeable bias, \
         citing specific examples for each of the articles. \
         Respond in JSON format with two keys: 'summary' (a paragraph) and 'articles' \
         (a list of objects, each with 'newsoutlet', 'newsanalysis', and 'bias_level'). \
         Here is an example of the expected JSON schema:\n\
         {schema}\
         Please strictly follow this format in your response and dont not exclude any news outlet from the input \
         in response and include atleast one response from each of the countries {countries} \
         for bias give one of the values {bias_levels} and use one source one news for clarity",
        schema = JSON_SCHEMA_EXAMPLE,
        countries = REQUIRED_COUNTRIES.join(", "),
        bias_levels = bias_levels,
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(source: &str, country: &str, title: &str) -> Article {
        Article {
            title: title.to_string(),
            summary: format!("Summary of {}", title),
            link: format!("https://{}.example/story", source.to_lowercase().replace(' ', "-")),
            source: source.to_string(),
            country: country.to_string(),
            published: None,
        }
    }

    #[test]
    fn test_single_article_template() {
        let context = AnalysisContext::new("election", vec![article("BBC News", "UK", "Polls open")]);
        let prompt = build_prompt(&context);
        assert_eq!(
            prompt,
            "Here is a news article about 'election':\n\n\
             Source: BBC News (UK)\n\
             Title: Polls open\n\
             Summary: Summary of Polls open\n\
             Link: https://bbc-news.example/story\n\n\
             Analyze the fairness and any noticeable bias in the article above. \
             Does the language appear neutral or does it favor a particular perspective? \
             Write a short paragraph with your analysis, citing specific phrases or examples."
        );
        assert!(!prompt.contains("JSON"));
    }

    #[test]
    fn test_multi_article_template() {
        let articles = vec![
            article("CNN", "USA", "Candidates debate"),
            article("RT", "Russia", "Western vote questioned"),
            article("NDTV", "India", "Turnout climbs"),
        ];
        let prompt = build_prompt(&AnalysisContext::new("election", articles.clone()));

        assert!(prompt.starts_with(
            "Analyze the following news coverage on 'election' from multiple sources. \
             Assess the fairness, bias, and any missing perspectives. Here are the articles:\n\n"
        ));
        for a in &articles {
            assert!(prompt.contains(&format!("Source: {} ({})\n", a.source, a.country)));
            assert!(prompt.contains(&format!("Title: {}\n", a.title)));
            assert!(prompt.contains(&format!("Summary: {}\n", a.summary)));
            assert!(prompt.contains(&format!("Link: {}\n\n", a.link)));
        }
        assert!(prompt.contains(JSON_SCHEMA_EXAMPLE));
        assert!(prompt.contains(
            "France, USA, Japan, China, India, United Kingdom, Germany, Australia, Russia"
        ));
        assert!(prompt.contains(
            "Please strictly follow this format in your response and dont not exclude any news outlet \
             from the input in response and include atleast one response from each of the countries "
        ));
        assert!(prompt.ends_with(
            "for bias give one of the values Neutral, Slightly Negative, Extreme Bias (Distraction) \
             and use one source one news for clarity"
        ));

        // Articles appear in collection order
        let cnn = prompt.find("Source: CNN").unwrap();
        let rt = prompt.find("Source: RT").unwrap();
        let ndtv = prompt.find("Source: NDTV").unwrap();
        assert!(cnn < rt && rt < ndtv);
    }

    #[test]
    fn test_template_switches_at_one_article() {
        let one = AnalysisContext::new("trade", vec![article("CNN", "USA", "Tariffs")]);
        let two = AnalysisContext::new(
            "trade",
            vec![article("CNN", "USA", "Tariffs"), article("Japan Times", "Japan", "Exports")],
        );
        let none = AnalysisContext::new("trade", Vec::new());

        assert!(build_prompt(&one).starts_with("Here is a news article"));
        assert!(build_prompt(&two).starts_with("Analyze the following news coverage"));
        assert!(build_prompt(&none).starts_with("Analyze the following news coverage"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let context = AnalysisContext::new(
            "climate",
            vec![article("France 24", "France", "Heatwave"), article("China Daily", "China", "Solar")],
        );
        assert_eq!(build_prompt(&context), build_prompt(&context.clone()));
    }
}
