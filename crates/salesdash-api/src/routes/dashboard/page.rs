//! Dashboard page rendering - HTMX page endpoint

use crate::chart::{render_svg, ChartStyle};
use crate::session::ensure_session;
use crate::routes::upload::UPLOAD_FIELD;
use crate::{page_response, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Query;
use salesdash_config::ChartType;
use salesdash_core::{render_dashboard, DashboardView, ErrorDetails, LoadedView, Selection, SelectionRequest, UnlockedContent};
use salesdash_utils::{escape_html, format_amount, format_number};
use std::collections::BTreeSet;

pub const APP_TITLE: &str = "CSV Data Analysis";

pub async fn page_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(request): Query<SelectionRequest>,
) -> (CookieJar, Html<String>) {
    let (jar, session_id) = ensure_session(jar);
    let session = state.sessions.get(&session_id).await;
    let view = render_dashboard(
        session.access,
        &session.upload,
        &request,
        state.config.charts.default_chart_type,
    );
    let content = render_app(&view, &state.chart_style);
    (jar, Html(page_response(&headers, APP_TITLE, &content)))
}

/// Sidebar and main area for a render description
pub fn render_app(view: &DashboardView, style: &ChartStyle) -> String {
    let (sidebar, main) = match view {
        DashboardView::Locked { message } => (
            format!("{}{}", password_form(), status_box(message, false)),
            String::new(),
        ),
        DashboardView::Unlocked { message, content } => {
            let mut sidebar = format!("{}{}", password_form(), status_box(message, true));
            let main = match content {
                UnlockedContent::AwaitingUpload => upload_form(None),
                UnlockedContent::UploadFailed { file_name, error } => {
                    format!("{}{}", upload_form(None), error_panel(file_name, error))
                }
                UnlockedContent::Loaded(loaded) => {
                    sidebar.push_str(&filter_form(loaded));
                    format!("{}{}", upload_form(Some(loaded)), loaded_content(loaded, style))
                }
            };
            (sidebar, main)
        }
    };

    format!(
        r#"<aside class='w-72 flex-shrink-0 bg-white border-r p-4 space-y-4'>{}</aside>
<main class='flex-1 overflow-auto bg-gray-50 p-6'>
    <div class='mb-6'><h1 class='text-3xl font-bold'>{}</h1></div>
    {}
</main>"#,
        sidebar, APP_TITLE, main
    )
}

fn password_form() -> String {
    r#"<form method='post' action='/unlock' class='space-y-2'>
    <label for='password' class='block text-sm font-medium text-gray-700'>Enter Password:</label>
    <input id='password' type='password' name='password' autocomplete='current-password' class='w-full px-3 py-2 border rounded-lg'>
    <button type='submit' class='w-full px-3 py-2 bg-indigo-600 text-white rounded-lg'>Unlock</button>
</form>"#
        .to_string()
}

fn status_box(message: &str, success: bool) -> String {
    let class = if success {
        "bg-green-50 border-green-200 text-green-700"
    } else {
        "bg-red-50 border-red-200 text-red-700"
    };
    format!(
        "<div class='p-3 rounded-lg border {}'>{}</div>",
        class,
        escape_html(message)
    )
}

fn upload_form(loaded: Option<&LoadedView>) -> String {
    let current = loaded
        .map(|l| {
            format!(
                "<p class='text-sm text-gray-500 mt-2'>Loaded {} ({} rows)</p>",
                escape_html(&l.source_name),
                format_number(l.row_count)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
    <form method='post' action='/upload' enctype='multipart/form-data' class='flex items-center gap-4'>
        <label class='text-sm font-medium text-gray-700'>Upload a CSV file
            <input type='file' name='{}' accept='.csv' class='block mt-1'>
        </label>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg'>Upload</button>
    </form>
    {}
</div>"#,
        UPLOAD_FIELD, current
    )
}

fn error_panel(file_name: &str, error: &ErrorDetails) -> String {
    let suggestions: String = error
        .suggestions
        .iter()
        .map(|s| format!("<li>{}</li>", escape_html(s)))
        .collect();
    format!(
        r#"<div class='bg-red-50 border border-red-200 rounded-xl p-6' role='alert'>
    <h3 class='text-lg font-semibold text-red-700 mb-2'>Could not load {}</h3>
    <p class='text-red-700'>{}</p>
    <ul class='list-disc ml-6 mt-2 text-sm text-red-600'>{}</ul>
    <p class='text-xs text-red-400 mt-2'>{}</p>
</div>"#,
        escape_html(file_name),
        escape_html(&error.message),
        suggestions,
        error.code
    )
}

fn multi_select(label: &str, name: &str, options: &[String], selected: &BTreeSet<String>) -> String {
    let items: String = options
        .iter()
        .map(|o| {
            format!(
                "<option value='{0}'{1}>{0}</option>",
                escape_html(o),
                if selected.contains(o) { " selected" } else { "" }
            )
        })
        .collect();
    format!(
        r#"<label class='block text-sm font-medium text-gray-700'>{}
    <select name='{}' multiple size='{}' class='w-full mt-1 px-2 py-1 border rounded-lg'>{}</select>
</label>"#,
        label,
        name,
        options.len().clamp(1, 8),
        items
    )
}

fn chart_select(current: ChartType) -> String {
    let items: String = ChartType::ALL
        .iter()
        .map(|t| {
            format!(
                "<option value='{}'{}>{}</option>",
                t,
                if *t == current { " selected" } else { "" },
                t.label()
            )
        })
        .collect();
    format!(
        r#"<label class='block text-sm font-medium text-gray-700'>Select Chart Type
    <select name='chart' class='w-full mt-1 px-2 py-1 border rounded-lg'>{}</select>
</label>"#,
        items
    )
}

/// Sidebar filters. Every change re-renders `#app` through htmx; the hidden
/// `prev_years` fields record which years the month list belongs to.
fn filter_form(loaded: &LoadedView) -> String {
    let selection = &loaded.selection;
    let previous: String = selection
        .years
        .iter()
        .map(|y| format!("<input type='hidden' name='prev_years' value='{}'>", escape_html(y)))
        .collect();
    format!(
        r#"<form id='filters' method='get' action='/' hx-get='/' hx-trigger='change' hx-target='#app' hx-push-url='true' class='space-y-4'>
    <input type='hidden' name='submitted' value='true'>
    {}
    {}
    {}
    {}
    {}
    <noscript><button type='submit' class='w-full px-3 py-2 border rounded-lg'>Apply</button></noscript>
</form>"#,
        previous,
        multi_select("Select Transaction Years", "years", &loaded.options.years, &selection.years),
        multi_select("Select Transaction Months", "months", &loaded.options.months, &selection.months),
        multi_select("Select Locations", "locations", &loaded.options.locations, &selection.locations),
        chart_select(selection.chart_type)
    )
}

/// Query string reproducing a selection, for links to the chart image
pub fn selection_query(selection: &Selection) -> String {
    let mut pairs: Vec<String> = Vec::new();
    for (key, values) in [
        ("years", &selection.years),
        ("months", &selection.months),
        ("locations", &selection.locations),
        ("prev_years", &selection.years),
    ] {
        pairs.extend(values.iter().map(|v| format!("{}={}", key, urlencoding::encode(v))));
    }
    pairs.push(format!("chart={}", selection.chart_type));
    pairs.push("submitted=true".to_string());
    pairs.join("&")
}

fn loaded_content(loaded: &LoadedView, style: &ChartStyle) -> String {
    let rows: String = loaded
        .rows
        .iter()
        .map(|r| {
            format!(
                "<tr class='border-b'><td class='px-3 py-2'>{}</td><td class='px-3 py-2'>{}</td><td class='px-3 py-2 text-right'>{}</td><td class='px-3 py-2 text-right'>{}</td><td class='px-3 py-2 text-right {}'>{}</td></tr>",
                escape_html(&r.transaction_location),
                escape_html(&r.transaction_month),
                format_amount(r.total_delivered),
                format_amount(r.total_returned),
                if r.billable().is_sign_negative() { "text-red-600" } else { "" },
                format_amount(r.billable())
            )
        })
        .collect();

    let chart = match render_svg(&loaded.chart, style) {
        Ok(svg) => svg,
        Err(e) => {
            log::error!("Chart rendering failed: {}", e);
            format!("<p class='text-red-600'>Chart unavailable: {}</p>", escape_html(&e))
        }
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
    <p class='text-sm text-gray-600'>Total Billable Amount</p>
    <p class='text-3xl font-bold text-indigo-600'>{}</p>
</div>
<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
    <h3 class='text-lg font-semibold mb-4'>Monthly Totals per Location</h3>
    <table class='w-full text-sm'>
        <thead><tr class='border-b text-left text-gray-500'><th class='px-3 py-2'>transaction_location</th><th class='px-3 py-2'>transaction_month</th><th class='px-3 py-2 text-right'>total_delivered</th><th class='px-3 py-2 text-right'>total_returned</th><th class='px-3 py-2 text-right'>billable</th></tr></thead>
        <tbody>{}</tbody>
    </table>
</div>
<div class='bg-white rounded-xl shadow-sm p-6'>
    <div class='overflow-x-auto'>{}</div>
    <a href='/chart.svg?{}' class='text-sm text-indigo-600' target='_blank'>Open chart as SVG</a>
</div>"#,
        format_amount(loaded.total_billable),
        rows,
        chart,
        escape_html(&selection_query(&loaded.selection))
    )
}
