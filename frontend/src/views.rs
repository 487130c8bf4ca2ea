//! 页面视图：把后端模型渲染为 HTML 字符串
//!
//! 所有来自后端的文本都经过转义。

use voyage::router::escape_html;
use voyage_shared::{Place, PlaceKind, Suggestion, SuggestionKind, Tour};

const PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.jpg";

/// 站内链接：`base` 为路由的前缀（可为空）
fn link(base: &str, path: &str) -> String {
    escape_html(&format!("{}{}", base, path))
}

pub fn not_found(base: &str) -> String {
    format!(
        r#"<section class="not-found"><h1>404</h1><p>This page does not exist.</p><a href="{}">Browse tours</a></section>"#,
        link(base, "/")
    )
}

fn price(tour: &Tour) -> Option<String> {
    let amount = tour.price?;
    let currency = tour.currency.as_deref().unwrap_or("EUR");
    Some(format!("{:.2} {}", amount, escape_html(currency)))
}

fn departure(tour: &Tour) -> Option<String> {
    match tour.departure() {
        Some(date) => Some(date.format("%-d %B %Y").to_string()),
        None => tour.departure_date.as_deref().map(escape_html),
    }
}

fn image(src: Option<&str>, alt: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" loading="lazy">"#,
        escape_html(src.unwrap_or(PLACEHOLDER_IMAGE)),
        escape_html(alt)
    )
}

// =========================================================
// 线路
// =========================================================

pub fn tour_list(base: &str, tours: &[Tour]) -> String {
    if tours.is_empty() {
        return r#"<section class="tours empty"><p>No tours available right now.</p></section>"#
            .to_string();
    }

    let cards: String = tours
        .iter()
        .map(|tour| {
            let meta = [
                tour.destination.as_deref().map(escape_html),
                tour.duration_days.map(|days| format!("{} days", days)),
                price(tour),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");
            format!(
                r#"<article class="tour-card"><a href="{href}">{img}<h2>{name}</h2></a><p class="meta">{meta}</p></article>"#,
                href = link(base, &format!("/tour/{}", tour.id)),
                img = image(tour.image.as_deref(), &tour.name),
                name = escape_html(&tour.name),
                meta = meta,
            )
        })
        .collect();

    format!(r#"<section class="tours">{}</section>"#, cards)
}

pub fn tour_detail(base: &str, tour: &Tour) -> String {
    let mut html = format!(
        r#"<article class="tour-detail">{}<h1>{}</h1>"#,
        image(tour.image.as_deref(), &tour.name),
        escape_html(&tour.name)
    );

    let mut facts = Vec::new();
    if let Some(destination) = &tour.destination {
        let place = match &tour.country {
            Some(country) => format!("{}, {}", destination, country),
            None => destination.clone(),
        };
        facts.push(format!("<li>Destination: {}</li>", escape_html(&place)));
    }
    if let Some(days) = tour.duration_days {
        facts.push(format!("<li>Duration: {} days</li>", days));
    }
    if let Some(date) = departure(tour) {
        facts.push(format!("<li>Departure: {}</li>", date));
    }
    if let Some(price) = price(tour) {
        facts.push(format!("<li>Price: {}</li>", price));
    }
    if !facts.is_empty() {
        html.push_str(&format!(r#"<ul class="facts">{}</ul>"#, facts.concat()));
    }

    if let Some(description) = &tour.description {
        html.push_str(&format!("<p>{}</p>", escape_html(description)));
    }

    if !tour.itinerary.is_empty() {
        html.push_str(r#"<h2>Itinerary</h2><ol class="itinerary">"#);
        for day in &tour.itinerary {
            html.push_str(&format!(
                "<li><strong>Day {}: {}</strong>",
                day.day,
                escape_html(&day.title)
            ));
            if let Some(description) = &day.description {
                html.push_str(&format!("<p>{}</p>", escape_html(description)));
            }
            html.push_str("</li>");
        }
        html.push_str("</ol>");
    }

    if !tour.stops.is_empty() {
        html.push_str(r#"<h2>Along the way</h2><ul class="stops">"#);
        for stop in &tour.stops {
            let name = escape_html(&stop.name);
            match stop.kind {
                Some(kind) => html.push_str(&format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    link(base, &format!("/place/{}/{}", kind.as_str(), stop.id)),
                    name
                )),
                None => html.push_str(&format!("<li>{}</li>", name)),
            }
        }
        html.push_str("</ul>");
    }

    html.push_str(&enquiry_form(&tour.id));
    html.push_str("</article>");
    html
}

/// 线路咨询表单，提交由浏览器适配层接管
pub fn enquiry_form(tour_id: &str) -> String {
    format!(
        r#"<form id="enquiry" method="post" action="/api/enquiries"><input type="hidden" name="tour_id" value="{}"><input type="email" name="email" required placeholder="Email"><textarea name="message" placeholder="Your question"></textarea><button type="submit">Ask about this tour</button></form>"#,
        escape_html(tour_id)
    )
}

// =========================================================
// 地点
// =========================================================

fn kind_label(kind: PlaceKind) -> &'static str {
    match kind {
        PlaceKind::Hotel => "Hotel",
        PlaceKind::Restaurant => "Restaurant",
        PlaceKind::Attraction => "Attraction",
        PlaceKind::City => "City",
    }
}

pub fn place_detail(place: &Place) -> String {
    let mut html = format!(
        r#"<article class="place-detail">{}<h1>{}</h1>"#,
        image(place.image.as_deref(), &place.name),
        escape_html(&place.name)
    );
    if let Some(kind) = place.kind {
        html.push_str(&format!(r#"<p class="kind">{}</p>"#, kind_label(kind)));
    }
    if let Some(rating) = place.rating {
        html.push_str(&format!(r#"<p class="rating">{:.1} / 5</p>"#, rating));
    }
    if let Some(address) = &place.address {
        html.push_str(&format!("<address>{}</address>", escape_html(address)));
    }
    if let Some(description) = &place.description {
        html.push_str(&format!("<p>{}</p>", escape_html(description)));
    }
    html.push_str("</article>");
    html
}

// =========================================================
// 搜索
// =========================================================

pub fn search_page(
    base: &str,
    kind: SuggestionKind,
    term: &str,
    results: &[Suggestion],
) -> String {
    let options: String = [
        SuggestionKind::City,
        SuggestionKind::Country,
        SuggestionKind::Hotel,
        SuggestionKind::Restaurant,
    ]
    .iter()
    .map(|option| {
        let value = option.as_path_segment();
        let selected = if *option == kind { " selected" } else { "" };
        format!(r#"<option value="{}"{}>{}</option>"#, value, selected, value)
    })
    .collect();

    let mut html = format!(
        r#"<section class="search"><form method="get" action="{}"><select name="kind">{}</select><input type="search" name="q" value="{}" autocomplete="off"><button type="submit">Search</button></form>"#,
        link(base, "/search"),
        options,
        escape_html(term)
    );
    if !term.trim().is_empty() {
        html.push_str(&suggestions(results));
    }
    html.push_str("</section>");
    html
}

pub fn suggestions(results: &[Suggestion]) -> String {
    if results.is_empty() {
        return r#"<p class="no-results">Nothing matches your search.</p>"#.to_string();
    }
    let items: String = results
        .iter()
        .map(|s| match &s.country {
            Some(country) => format!(
                "<li>{} <small>{}</small></li>",
                escape_html(&s.label),
                escape_html(country)
            ),
            None => format!("<li>{}</li>", escape_html(&s.label)),
        })
        .collect();
    format!(r#"<ul class="suggestions">{}</ul>"#, items)
}

/// `?kind=` 的取值；单复数均可，无法识别时按城市处理
pub fn parse_suggestion_kind(value: Option<&str>) -> SuggestionKind {
    match value.map(|v| v.trim_end_matches('s')) {
        Some("countrie") | Some("country") => SuggestionKind::Country,
        Some("hotel") => SuggestionKind::Hotel,
        Some("restaurant") => SuggestionKind::Restaurant,
        _ => SuggestionKind::City,
    }
}
