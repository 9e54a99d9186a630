//! Content library - read-only per-variant content, loaded once.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::AgentVariant;

use super::item::{ContentItem, FraudCase, Faq, Product, Recipe, Scenario};

/// Immutable content shared by every session of a process.
///
/// Queries borrow; nothing is copied per call.
#[derive(Debug, Clone, Default)]
pub struct ContentLibrary {
    by_variant: HashMap<AgentVariant, Arc<[ContentItem]>>,
}

impl ContentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, variant: AgentVariant, items: Vec<ContentItem>) -> Self {
        self.insert(variant, items);
        self
    }

    pub fn insert(&mut self, variant: AgentVariant, items: Vec<ContentItem>) {
        self.by_variant.insert(variant, Arc::from(items));
    }

    /// All items for a variant; empty if none were loaded.
    pub fn load(&self, variant: AgentVariant) -> &[ContentItem] {
        self.by_variant
            .get(&variant)
            .map(|items| &items[..])
            .unwrap_or(&[])
    }

    /// Lazily yields the variant's items matching `predicate`.
    pub fn query<'a, P>(&'a self, variant: AgentVariant, predicate: P) -> impl Iterator<Item = &'a ContentItem> + 'a
    where
        P: Fn(&ContentItem) -> bool + 'a,
    {
        self.load(variant).iter().filter(move |item| predicate(*item))
    }

    pub fn scenarios(&self, variant: AgentVariant) -> impl Iterator<Item = &Scenario> {
        self.load(variant).iter().filter_map(ContentItem::as_scenario)
    }

    pub fn faqs(&self, variant: AgentVariant) -> impl Iterator<Item = &Faq> {
        self.load(variant).iter().filter_map(ContentItem::as_faq)
    }

    pub fn products(&self, variant: AgentVariant) -> impl Iterator<Item = &Product> {
        self.load(variant).iter().filter_map(ContentItem::as_product)
    }

    pub fn recipes(&self, variant: AgentVariant) -> impl Iterator<Item = &Recipe> {
        self.load(variant).iter().filter_map(ContentItem::as_recipe)
    }

    pub fn fraud_cases(&self, variant: AgentVariant) -> impl Iterator<Item = &FraudCase> {
        self.load(variant).iter().filter_map(ContentItem::as_fraud_case)
    }

    pub fn product(&self, variant: AgentVariant, id: &str) -> Option<&Product> {
        self.products(variant).find(|p| p.id == id)
    }

    pub fn item_count(&self, variant: AgentVariant) -> usize {
        self.load(variant).len()
    }
}
