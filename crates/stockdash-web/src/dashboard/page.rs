//! Server-rendered dashboard page.

use minijinja::{context, Environment};
use serde::Serialize;
use stockdash_core::RangeToken;

use super::state::DashboardState;
use super::view::{EpsChart, LineChart, MetricsTable};

// `.html` name turns on HTML autoescaping. `tojson` escapes `<`, `>` and `&`,
// so chart configs cannot close the surrounding script element.
const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Stock Comparison Dashboard</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<style>
body { font-family: sans-serif; margin: 2rem; }
.range a { display: inline-block; padding: 0.3rem 0.8rem; margin-right: 0.3rem; border: 1px solid #888; color: black; text-decoration: none; }
.range a.confirmed { background: lightblue; }
.range a.pending { border-style: dashed; }
.error { background: #fdd; border: 1px solid #c00; padding: 0.5rem; margin: 1rem 0; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid #888; padding: 0.3rem 0.8rem; }
</style>
</head>
<body>
<h1>Stock Comparison Dashboard</h1>
<form action="/fetch" method="get">
<input type="text" name="tickers" placeholder="Enter stock tickers (comma-separated)" value="{{ ticker_input }}">
<button type="submit">Fetch</button>
</form>
<div class="range">
{%- for range in ranges %}
<a href="/range/{{ range.token }}" class="{% if range.confirmed %}confirmed{% endif %}{% if range.pending %} pending{% endif %}">{{ range.token }}</a>
{%- endfor %}
</div>
{%- if error %}
<div class="error" role="alert">{{ error }}</div>
{%- endif %}
{%- if has_data %}
<canvas id="price-chart"></canvas>
<table>
<thead><tr>{% for header in table_headers %}<th>{{ header }}</th>{% endfor %}</tr></thead>
<tbody>
{%- for row in table.rows %}
<tr><td>{{ row.ticker }}</td><td>{{ row.pe_ratio }}</td><td>{{ row.ebitda }}</td></tr>
{%- endfor %}
</tbody>
</table>
<canvas id="eps-chart"></canvas>
<script>
new Chart(document.getElementById("price-chart"), {{ line_chart|tojson }});
new Chart(document.getElementById("eps-chart"), {{ eps_chart|tojson }});
</script>
{%- endif %}
</body>
</html>
"#;

#[derive(Serialize)]
struct RangeButton {
    token: &'static str,
    confirmed: bool,
    pending: bool,
}

fn range_buttons(state: &DashboardState) -> Vec<RangeButton> {
    RangeToken::ALL
        .iter()
        .map(|&token| RangeButton {
            token: token.as_str(),
            confirmed: token == state.confirmed_range(),
            pending: state.pending_range() == Some(token),
        })
        .collect()
}

/// Render the full dashboard page for `state`.
pub fn render(state: &DashboardState) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let (line_chart, eps_chart, table) = match state.data() {
        Some(results) => (
            Some(LineChart::from_results(results).to_config()),
            Some(EpsChart::from_results(results).to_config()),
            Some(MetricsTable::from_results(results)),
        ),
        None => (None, None, None),
    };

    template.render(context! {
        ticker_input => state.ticker_input(),
        ranges => range_buttons(state),
        error => state.last_error(),
        has_data => state.data().is_some(),
        table_headers => MetricsTable::HEADERS,
        table => table,
        line_chart => line_chart,
        eps_chart => eps_chart,
    })
}
