//! Keyword search and catalog filtering over content.

use serde::{Deserialize, Serialize};

use super::item::{Faq, Product};

fn keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Counts query keywords found in the FAQ's question, answer or tags.
pub fn faq_score(faq: &Faq, query: &str) -> usize {
    let haystack = format!("{} {} {}", faq.question, faq.answer, faq.tags.join(" ")).to_lowercase();
    keywords(query)
        .iter()
        .filter(|word| haystack.contains(word.as_str()))
        .count()
}

/// Highest-scoring FAQ for the query; `None` when nothing scores.
///
/// Ties go to the entry listed first.
pub fn best_faq<'a>(faqs: impl IntoIterator<Item = &'a Faq>, query: &str) -> Option<&'a Faq> {
    let mut best: Option<(&Faq, usize)> = None;
    for faq in faqs {
        let score = faq_score(faq, query);
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((faq, score));
        }
    }
    best.map(|(faq, _)| faq)
}

/// Catalog filter; unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_ref()
            .map_or(true, |c| product.category.eq_ignore_ascii_case(c));
        let color_ok = self.color.as_ref().map_or(true, |c| {
            product
                .color
                .as_ref()
                .map_or(false, |pc| pc.eq_ignore_ascii_case(c))
        });
        let price_ok = self.max_price.map_or(true, |max| product.price <= max);
        let keyword_ok = self.keyword.as_ref().map_or(true, |k| {
            let k = k.to_lowercase();
            product.name.to_lowercase().contains(&k) || product.description.to_lowercase().contains(&k)
        });
        category_ok && color_ok && price_ok && keyword_ok
    }
}

/// Catalog items whose name or any tag contains the query.
pub fn search_catalog<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    query: &str,
) -> Vec<&'a Product> {
    let q = query.trim().to_lowercase();
    products
        .into_iter()
        .filter(|p| {
            p.id.eq_ignore_ascii_case(&q)
                || p.name.to_lowercase().contains(&q)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&q))
        })
        .collect()
}
