//! HTML views
//!
//! The whole UI is one page: the two-column form, and below it the result
//! section after a prediction.

use axum::http::StatusCode;
use dysphagia_core::constants::APP_NAME;
use dysphagia_core::logic::explain::{
    force_plot_svg, importance_bar_svg, mean_abs_importance, Explanation,
};
use dysphagia_core::logic::features::schema::{ChoiceStyle, FormColumn};
use dysphagia_core::logic::features::{FormControl, PatientRecord, Widget};
use dysphagia_core::logic::Assessment;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem 2rem; color: #262730; }
h1 { font-size: 1.9rem; }
hr { border: none; border-top: 1px solid #ddd; margin: 1.5rem 0; }
.columns { display: flex; gap: 3rem; }
.column { flex: 1; }
.control { margin-bottom: 1rem; }
.control label.title { display: block; font-size: 0.9rem; margin-bottom: 0.3rem; }
.control input[type=range] { width: 80%; }
.control output { margin-left: 0.5rem; font-variant-numeric: tabular-nums; }
.control .radio { margin-right: 1rem; }
button.predict { width: 100%; padding: 0.6rem; font-size: 1rem; }
.metric .label { font-size: 0.9rem; }
.metric .value { font-size: 2.2rem; }
progress { width: 100%; height: 0.8rem; }
.caption { font-size: 0.85rem; color: #6b6f76; }
.error { background: #ffecec; color: #7d1a1a; padding: 0.8rem; border-radius: 4px; }
table.inputs { border-collapse: collapse; }
table.inputs td, table.inputs th { border: 1px solid #ddd; padding: 0.3rem 0.8rem; text-align: left; }
#working { display: none; }
"#;

/// Shows the working indicator while the page waits for the prediction
const SUBMIT_SCRIPT: &str = r#"
document.getElementById('assessment-form').addEventListener('submit', function () {
  document.getElementById('working').style.display = 'block';
});
document.querySelectorAll('input[type=range]').forEach(function (input) {
  input.addEventListener('input', function () {
    document.getElementById(input.id + '-value').textContent = input.value;
  });
});
"#;

pub fn escape(text: &str) -> String {
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

// ============================================================================
// PAGE
// ============================================================================

/// Full page. `result` is the pre-rendered result section, if any.
pub fn page(controls: &[FormControl], show_input: bool, result: Option<&str>) -> String {
    let column = |which: FormColumn| -> String {
        controls
            .iter()
            .filter(|c| c.column == which)
            .map(control_html)
            .collect()
    };

    let checked = if show_input { " checked" } else { "" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>{title} Prediction Model</h1>
<hr>
<form id="assessment-form" method="post" action="/predict">
<div class="columns">
<div class="column">
<h2>Patient information</h2>
{patient}
</div>
<div class="column">
<h2>Clinical features</h2>
{clinical}
</div>
</div>
<hr>
<button class="predict" type="submit">Predict dysphagia risk</button>
<p id="working" class="caption">Generating explanation…</p>
<hr>
<label><input type="checkbox" name="show_input" value="on"{checked}> Show input details</label>
</form>
{result}
<hr>
<p class="caption">© 2025 {title} Prediction Model | For use by medical professionals only</p>
<script>{script}</script>
</body>
</html>
"#,
        title = escape(APP_NAME),
        style = STYLE,
        patient = column(FormColumn::Patient),
        clinical = column(FormColumn::Clinical),
        checked = checked,
        result = result.unwrap_or(""),
        script = SUBMIT_SCRIPT,
    )
}

fn control_html(control: &FormControl) -> String {
    let name = escape(control.name);
    let label = escape(&control.label);

    let input = match &control.widget {
        Widget::Slider { min, max, step, value } => format!(
            r#"<input type="range" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}"><output id="{name}-value">{value}</output>"#
        ),
        Widget::Choice { style: ChoiceStyle::Radio, options, selected } => options
            .iter()
            .map(|option| {
                let checked = if option == selected { " checked" } else { "" };
                format!(
                    r#"<label class="radio"><input type="radio" name="{name}" value="{option}"{checked}> {option}</label>"#,
                    option = escape(option)
                )
            })
            .collect(),
        Widget::Choice { style: ChoiceStyle::Select, options, selected } => {
            let options: String = options
                .iter()
                .map(|option| {
                    let selected = if option == selected { " selected" } else { "" };
                    format!(r#"<option{selected}>{}</option>"#, escape(option))
                })
                .collect();
            format!(r#"<select id="{name}" name="{name}">{options}</select>"#)
        }
    };

    format!(
        r#"<div class="control"><label class="title" for="{name}">{label}</label>{input}</div>
"#
    )
}

// ============================================================================
// RESULT SECTION
// ============================================================================

pub fn result_section(assessment: &Assessment, record: &PatientRecord, show_input: bool) -> String {
    let prediction = &assessment.prediction;
    let band = prediction.band;

    let mut html = format!(
        r#"<hr>
<section id="result">
<h2>Prediction result</h2>
<div class="metric"><div class="label">Dysphagia risk probability</div><div class="value">{percent:.1}%</div></div>
<progress value="{progress}" max="100"></progress>
<p class="caption">Risk level: <span class="risk" style="color: {color}">{label}</span></p>
"#,
        percent = prediction.percent,
        progress = prediction.percent.trunc(),
        color = band.color(),
        label = band.label(),
    );

    match &assessment.explanation {
        Some(Ok(explanation)) => html.push_str(&explanation_html(explanation)),
        Some(Err(message)) => html.push_str(&format!(
            r#"<h2>Risk factor analysis</h2>
<p class="error">Error generating explanation: {}</p>
"#,
            escape(message)
        )),
        None => {}
    }

    if show_input {
        html.push_str(&input_table(record));
    }

    html.push_str("</section>\n");
    html
}

fn explanation_html(explanation: &Explanation) -> String {
    let ranking = mean_abs_importance(std::slice::from_ref(explanation));
    format!(
        r#"<h2>Risk factor analysis</h2>
<h3>Feature contributions</h3>
<figure class="force-plot">{}</figure>
<h3>Feature importance</h3>
<figure class="importance-plot">{}</figure>
"#,
        force_plot_svg(explanation),
        importance_bar_svg(&ranking)
    )
}

fn input_table(record: &PatientRecord) -> String {
    let rows: String = record
        .display_rows()
        .into_iter()
        .map(|(label, value)| {
            format!("<tr><td>{}</td><td>{}</td></tr>", escape(label), escape(&value))
        })
        .collect();

    format!(
        r#"<h2>Input details</h2>
<table class="inputs"><thead><tr><th>Feature</th><th>Value</th></tr></thead><tbody>{rows}</tbody></table>
"#
    )
}

// ============================================================================
// ERRORS
// ============================================================================

pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title><style>{style}</style></head>
<body>
<h1>{title}</h1>
<p class="error"><strong>{status}</strong> {message}</p>
<p><a href="/">Back to the form</a></p>
</body>
</html>
"#,
        title = escape(APP_NAME),
        style = STYLE,
        status = status,
        message = escape(message),
    )
}
