//! HTML pages. Data for the charts is embedded as JSON and drawn with Chart.js.

use std::fmt::Write;

use serde::Serialize;

use crate::yahoo::{
    LeagueInfo, PlayoffTeamStats, TeamSummary, WeeklyTeamResult, WeeklyTransactionStats,
};

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 2rem; color: #222; }
h1 { margin-bottom: 0.2rem; }
.sub { color: #666; margin-top: 0; }
nav a { margin-right: 1rem; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { padding: 0.35rem 0.7rem; border-bottom: 1px solid #ddd; text-align: right; }
th:nth-child(2), td:nth-child(2), th:nth-child(3), td:nth-child(3) { text-align: left; }
.pos { color: #1a7f37; } .neg { color: #c0392b; }
.chart { max-width: 960px; margin: 2rem 0; }
.error { background: #fdecea; border: 1px solid #c0392b; padding: 1rem; }
"#;

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// JSON safe to place inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{CHART_JS}"></script>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Dashboard</a><a href="/playoffs">Playoffs</a></nav>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn league_header(info: &LeagueInfo) -> String {
    format!(
        "<h1>{}</h1>\n<p class=\"sub\">{} season, week {} of {}{}</p>\n",
        escape_html(&info.name),
        info.season,
        info.current_week,
        info.end_week,
        if info.is_finished { " (finished)" } else { "" }
    )
}

fn signed_class(value: f64) -> &'static str {
    if value > 0.0 {
        "pos"
    } else if value < 0.0 {
        "neg"
    } else {
        ""
    }
}

pub fn dashboard(
    info: &LeagueInfo,
    summary: &[TeamSummary],
    weekly: &[WeeklyTeamResult],
    activity: &[WeeklyTransactionStats],
) -> String {
    let mut body = league_header(info);

    body.push_str(
        "<h2>Standings</h2>\n<table>\n<tr><th>Rank</th><th>Team</th><th>Manager</th>\
         <th>W-L-T</th><th>PF</th><th>PA</th><th>Win%</th><th>Exp W-L</th>\
         <th>Exp Win%</th><th>Diff</th></tr>\n",
    );
    for row in summary {
        let s = &row.standing;
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}-{}-{}</td><td>{:.2}</td><td>{:.2}</td>\
             <td>{:.3}</td><td>{}-{}</td><td>{:.1}</td><td class=\"{}\">{:+.1}</td></tr>",
            s.rank.map(|r| r.to_string()).unwrap_or_default(),
            escape_html(&s.team.name),
            escape_html(&s.team.manager_nickname),
            s.wins,
            s.losses,
            s.ties,
            s.points_for,
            s.points_against,
            s.win_percentage,
            row.expected_wins,
            row.expected_losses,
            row.expected_win_percentage,
            signed_class(row.win_percentage_difference),
            row.win_percentage_difference,
        );
    }
    body.push_str("</table>\n");

    let _ = write!(
        body,
        r#"<div class="chart"><canvas id="pointsChart"></canvas></div>
<div class="chart"><canvas id="allPlayChart"></canvas></div>
<div class="chart"><canvas id="movesChart"></canvas></div>
<div class="chart"><canvas id="faabChart"></canvas></div>
<script>
const weekly = {weekly};
const activity = {activity};
const series = (rows, key) => {{
  const teams = [...new Set(rows.map(r => r.team_name))];
  const weeks = [...new Set(rows.map(r => r.week))].sort((a, b) => a - b);
  return {{
    labels: weeks,
    datasets: teams.map(team => ({{
      label: team,
      data: weeks.map(w => {{
        const row = rows.find(r => r.team_name === team && r.week === w);
        return row ? row[key] : null;
      }}),
      tension: 0.2,
    }})),
  }};
}};
const lineChart = (id, rows, key, title, scales) => new Chart(document.getElementById(id), {{
  type: 'line',
  data: series(rows, key),
  options: {{ plugins: {{ title: {{ display: true, text: title }} }}, scales: scales || {{}} }},
}});
lineChart('pointsChart', weekly, 'points_for', 'Points per week');
lineChart('allPlayChart', weekly, 'record_percentage_vs_all', 'Record % vs all', {{ y: {{ min: 0, max: 100 }} }});
lineChart('movesChart', activity, 'number_of_moves', 'Roster moves (cumulative)');
lineChart('faabChart', activity, 'faab_balance', 'FAAB balance', {{ y: {{ min: 0 }} }});
</script>
"#,
        weekly = script_json(&weekly),
        activity = script_json(&activity),
    );

    page(&info.name, &body)
}

pub fn playoffs(info: &LeagueInfo, stats: &[PlayoffTeamStats]) -> String {
    let mut body = league_header(info);

    match stats.first() {
        Some(first) => {
            let _ = writeln!(
                body,
                "<h2>Playoffs: weeks {}-{}</h2>",
                first.playoff_start_week, first.playoff_end_week
            );
        }
        None => body.push_str("<h2>Playoffs</h2>\n"),
    }

    body.push_str(
        "<table>\n<tr><th>Games</th><th>Team</th><th>W-L-T</th><th>PF</th><th>PA</th>\
         <th>Moves</th><th>Trades</th><th>FAAB</th><th>Weeks</th></tr>\n",
    );
    for team in stats {
        let weeks = team
            .weeks
            .iter()
            .map(|w| format!("{} {} {:.2}", w.week, w.outcome, w.points_for))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}-{}-{}</td><td>{:.2}</td><td>{:.2}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            team.games,
            escape_html(&team.team_name),
            team.wins,
            team.losses,
            team.ties,
            team.points_for,
            team.points_against,
            team.number_of_moves,
            team.number_of_trades,
            team.faab_balance.map(|b| format!("${b}")).unwrap_or_default(),
            weeks,
        );
    }
    body.push_str("</table>\n");

    let _ = write!(
        body,
        r#"<div class="chart"><canvas id="playoffChart"></canvas></div>
<script>
const stats = {stats};
new Chart(document.getElementById('playoffChart'), {{
  type: 'bar',
  data: {{
    labels: stats.map(s => s.team_name),
    datasets: [
      {{ label: 'Points for', data: stats.map(s => s.points_for) }},
      {{ label: 'Points against', data: stats.map(s => s.points_against) }},
    ],
  }},
  options: {{ plugins: {{ title: {{ display: true, text: 'Playoff points' }} }} }},
}});
</script>
"#,
        stats = script_json(&stats),
    );

    page(&format!("{} playoffs", info.name), &body)
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        &format!(
            "<h1>Something went wrong</h1>\n<p class=\"error\">{}</p>\n\
             <p>If the session expired, run <code>yahoo-ffl auth</code> and reload.</p>\n",
            escape_html(message)
        ),
    )
}
