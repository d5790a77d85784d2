//! HTML pages for the proxy routes.

use crate::proxy::ProxyContext;

use super::{Article, Product};

/// Base path used for links when the platform did not send `path_prefix`.
const DIRECT_BASE: &str = "/proxy";

/// Escape HTML special characters to prevent XSS attacks.
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Storefront path the pages link back through, so follow-up requests are
/// signed by the platform again.
fn link_base(ctx: &ProxyContext) -> String {
    let base = ctx
        .path_prefix
        .as_deref()
        .map(|p| p.trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .unwrap_or(DIRECT_BASE);
    html_escape(base)
}

fn customer_line(ctx: &ProxyContext) -> String {
    match ctx.logged_in_customer() {
        Some(id) => format!("<p class=\"customer\">Customer ID: {}</p>", html_escape(id)),
        None => "<p class=\"customer\">Not logged in</p>".to_string(),
    }
}

fn page(title: &str, ctx: &ProxyContext, body: &str) -> String {
    let shop = html_escape(ctx.shop_or_unknown());
    let base = link_base(ctx);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {shop}</title>
    <style>
        body {{ font-family: Arial, sans-serif; padding: 20px; max-width: 960px; margin: 0 auto; }}
        nav a {{ margin-right: 12px; }}
        .card {{ margin: 20px 0; padding: 15px; border: 1px solid #ddd; border-radius: 6px; }}
        .meta {{ color: #666; font-size: 13px; }}
        .price {{ font-weight: bold; }}
        label {{ display: block; margin-top: 10px; }}
    </style>
</head>
<body>
    <nav>
        <a href="{base}">Home</a>
        <a href="{base}/news">News</a>
        <a href="{base}/products">Products</a>
        <a href="{base}/subscribe">Subscribe</a>
    </nav>
    <h1>{title}</h1>
{body}
    <footer class="meta">
        <p>Shop: {shop}</p>
        {customer}
    </footer>
</body>
</html>
"##,
        title = html_escape(title),
        shop = shop,
        base = base,
        body = body,
        customer = customer_line(ctx),
    )
}

/// Default page for the proxy root and any subpath without its own route.
pub fn render_home(ctx: &ProxyContext) -> String {
    let greeting = match ctx.logged_in_customer() {
        Some(_) => "Welcome back!",
        None => "Welcome!",
    };
    let subpath = ctx
        .subpath
        .as_deref()
        .map(|s| format!("\n        <p class=\"meta\">Requested: {}</p>", html_escape(s)))
        .unwrap_or_default();

    let body = format!(
        r#"    <div class="card">
        <h2>{greeting}</h2>
        <p>This content is served via the app proxy for {shop}.</p>{subpath}
    </div>"#,
        greeting = greeting,
        shop = html_escape(ctx.shop_or_unknown()),
        subpath = subpath,
    );

    page("Home", ctx, &body)
}

/// News listing.
pub fn render_news(ctx: &ProxyContext, articles: &[Article]) -> String {
    let body = if articles.is_empty() {
        "    <p>No news yet. Check back soon.</p>".to_string()
    } else {
        articles
            .iter()
            .map(|article| {
                format!(
                    r#"    <div class="card">
        <h2>{}</h2>
        <p class="meta">{}</p>
        <p>{}</p>
    </div>"#,
                    html_escape(&article.title),
                    html_escape(&article.published),
                    html_escape(&article.summary),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    page("Latest News", ctx, &body)
}

/// Product listing.
pub fn render_products(ctx: &ProxyContext, products: &[Product]) -> String {
    let body = if products.is_empty() {
        "    <p>No products available.</p>".to_string()
    } else {
        products
            .iter()
            .map(|product| {
                format!(
                    r#"    <div class="card">
        <h2>{}</h2>
        <p>{}</p>
        <p class="price">{}</p>
    </div>"#,
                    html_escape(&product.title),
                    html_escape(&product.description),
                    html_escape(&product.price),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    page("Products", ctx, &body)
}

/// Newsletter signup form. Posts back through the proxy as a form body.
pub fn render_subscribe_form(ctx: &ProxyContext) -> String {
    let body = format!(
        r#"    <div class="card">
        <p>Get our news in your inbox.</p>
        <form method="post" action="{base}/subscribe">
            <label for="name">Name</label>
            <input id="name" name="name" type="text" required>
            <label for="email">Email</label>
            <input id="email" name="email" type="email" required>
            <p><button type="submit">Subscribe</button></p>
        </form>
    </div>"#,
        base = link_base(ctx),
    );

    page("Subscribe", ctx, &body)
}
