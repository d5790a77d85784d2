//! Storefront content served through the proxy.
//!
//! A [`Catalog`] holds the news articles and products shown to shoppers;
//! [`render`] turns them into small standalone HTML pages. Every value that
//! comes from the request is escaped before it lands in markup.

pub mod render;

use serde::Serialize;

/// A news entry shown on the news page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub summary: String,

    /// Publication date as displayed (e.g. "2024-05-01")
    pub published: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            published: published.into(),
        }
    }
}

/// A product card shown on the products page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub title: String,
    pub description: String,

    /// Price as displayed, currency included (e.g. "$29.99")
    pub price: String,
}

impl Product {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price: price.into(),
        }
    }
}

/// Articles and products available to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub articles: Vec<Article>,
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn new(articles: Vec<Article>, products: Vec<Product>) -> Self {
        Self { articles, products }
    }

    /// A catalog with no content. Pages render their empty state.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            vec![
                Article::new(
                    "Welcome to our news page!",
                    "This content is served via the app proxy.",
                    "2024-01-15",
                ),
                Article::new(
                    "Spring collection is here",
                    "Fresh colours and lighter fabrics, available in store and online.",
                    "2024-03-01",
                ),
                Article::new(
                    "Free shipping weekend",
                    "Every order ships free from Friday to Sunday.",
                    "2024-04-12",
                ),
            ],
            vec![
                Product::new("Classic Tee", "Soft organic cotton, regular fit.", "$29.99"),
                Product::new("Canvas Tote", "Heavyweight canvas with inner pocket.", "$19.99"),
                Product::new("Wool Beanie", "Ribbed merino knit, one size.", "$24.99"),
            ],
        )
    }
}
