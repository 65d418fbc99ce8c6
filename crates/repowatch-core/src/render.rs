// HTML cards for the repositories section of the tracker page
use crate::{models::ScanEntry, snapshot::ScanSnapshot};

/// Active entries in display order: new first, then oldest update first.
///
/// Stale known repositories land near the top on purpose. The sort is stable.
pub fn ordered_active(entries: &[ScanEntry]) -> Vec<&ScanEntry> {
    let mut active: Vec<&ScanEntry> = entries.iter().filter(|e| e.is_active()).collect();
    active.sort_by(|a, b| {
        b.is_new
            .cmp(&a.is_new)
            .then_with(|| b.days_old().cmp(&a.days_old()))
    });
    active
}

/// All cards for a snapshot, joined with newlines
pub fn render_cards(snapshot: &ScanSnapshot) -> String {
    render_entries(&snapshot.repositories)
}

pub fn render_entries(entries: &[ScanEntry]) -> String {
    ordered_active(entries)
        .into_iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `source-card` block
pub fn render_card(entry: &ScanEntry) -> String {
    let color = entry
        .freshness
        .as_ref()
        .map(|f| f.color.css_class())
        .unwrap_or("");
    let badge = entry
        .freshness
        .as_ref()
        .map(|f| f.badge.as_str())
        .unwrap_or("❓");

    let (stars, size_kb, language) = match entry.metadata() {
        Some(meta) => (meta.stars, meta.size_kb, meta.language.as_deref()),
        None => (0, 0, None),
    };

    let new_badge = if entry.is_new {
        "<span class='new-badge'>🆕 NEW</span>"
    } else {
        ""
    };

    let language_html = language
        .filter(|l| !l.is_empty())
        .map(|l| format!("<span>💻 {}</span>", escape_html(l)))
        .unwrap_or_default();

    let website_html = entry
        .record
        .website
        .as_deref()
        .map(|w| {
            format!(
                r#"<a href="{}" target="_blank" class="source-link secondary">Website →</a>"#,
                escape_html(w)
            )
        })
        .unwrap_or_default();

    format!(
        r#"
                    <div class="source-card github-repo {color}">
                        <div class="source-header">
                            <h4>📦 {name}</h4>
                            <div class="source-badges">
                                {new_badge}
                                <span class="freshness-badge {color}">{badge}</span>
                                <span class="source-status active">✅ Active</span>
                            </div>
                        </div>
                        <p class="source-description">{description}</p>
                        <div class="source-meta">
                            <span>⭐ {stars} stars</span>
                            <span>📦 {size_kb} KB</span>
                            {language_html}
                        </div>
                        <div class="source-links">
                            <a href="{url}" target="_blank" class="source-link">GitHub Repo →</a>
                            {website_html}
                        </div>
                    </div>
"#,
        color = color,
        name = escape_html(&entry.record.name),
        new_badge = new_badge,
        badge = escape_html(badge),
        description = escape_html(&entry.record.description),
        stars = stars,
        size_kb = size_kb,
        language_html = language_html,
        url = escape_html(&entry.record.url),
        website_html = website_html,
    )
}

/// Minimal escaping for text and attribute values
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
