use crate::views::PageData;

/// Render a page as a standalone HTML document.
pub fn render(page: &PageData) -> String {
    let mut html = String::with_capacity(
        4096 + page.charts.iter().map(|c| c.image.len()).sum::<usize>(),
    );

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n",
        escape(&page.heading),
        escape(&page.heading)
    ));
    html.push_str("<nav><a href=\"/\">All baselines</a></nav>\n");

    baseline_form(&mut html, page);
    analysis_links(&mut html, page);

    for chart in &page.charts {
        html.push_str(&format!(
            "<figure>\n<figcaption>{}</figcaption>\n<img src=\"{}\" alt=\"{}\">\n</figure>\n",
            escape(&chart.title),
            chart.data_uri(),
            escape(&chart.title)
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn baseline_form(html: &mut String, page: &PageData) {
    html.push_str("<form method=\"post\" action=\"/\">\n<fieldset>\n<legend>Baselines</legend>\n");
    for baseline in &page.baselines {
        let checked = if page.selected_baselines.contains(baseline) {
            " checked"
        } else {
            ""
        };
        html.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"baselines\" value=\"{}\"{checked}> {}</label>\n",
            escape(baseline),
            escape(baseline)
        ));
    }
    html.push_str("</fieldset>\n<button type=\"submit\">Filter</button>\n</form>\n");
}

fn analysis_links(html: &mut String, page: &PageData) {
    html.push_str("<section>\n<h2>Steps</h2>\n<ul>\n");
    // An empty identifier has no path segment to link to
    for step in page.steps.iter().filter(|s| !s.is_empty()) {
        let current = if page.selected_step.as_ref() == Some(step) {
            " aria-current=\"page\""
        } else {
            ""
        };
        html.push_str(&format!(
            "<li><a href=\"/stepwise_analysis/{}\"{current}>{}</a></li>\n",
            path_segment(step),
            escape(step)
        ));
    }
    html.push_str("</ul>\n<h2>Baselines</h2>\n<ul>\n");
    for baseline in page.baselines.iter().filter(|b| !b.is_empty()) {
        let current = if page.selected_baseline.as_ref() == Some(baseline) {
            " aria-current=\"page\""
        } else {
            ""
        };
        html.push_str(&format!(
            "<li><a href=\"/baseline_analysis/{}\"{current}>{}</a></li>\n",
            path_segment(baseline),
            escape(baseline)
        ));
    }
    html.push_str("</ul>\n</section>\n");
}

/// Percent-encode a value for use as a single URL path segment.
pub fn path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Chart;

    #[test]
    fn escapes_labels() {
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(path_segment("0_Load"), "0_Load");
        assert_eq!(path_segment("R 2024/a+b"), "R%202024%2Fa%2Bb");
    }

    #[test]
    fn steps_without_an_id_get_no_link() {
        let page = PageData {
            heading: "Runs".to_string(),
            baselines: vec!["A".to_string()],
            steps: vec!["".to_string(), "s1".to_string()],
            ..Default::default()
        };

        let html = render(&page);
        assert!(!html.contains("href=\"/stepwise_analysis/\""));
        assert!(html.contains("<li><a href=\"/stepwise_analysis/s1\">s1</a></li>\n"));
        assert!(html.contains("<li><a href=\"/baseline_analysis/A\">A</a></li>\n"));
    }

    #[test]
    fn marks_selected_baselines() {
        let page = PageData {
            heading: "Runs".to_string(),
            baselines: vec!["A".to_string(), "B".to_string()],
            steps: vec!["s1".to_string()],
            selected_baselines: vec!["B".to_string()],
            charts: vec![Chart {
                title: "Memory Usage by Baseline and Step".to_string(),
                image: "PHN2Zy8+".to_string(),
            }],
            ..Default::default()
        };

        let html = render(&page);
        assert!(html.contains("value=\"A\"> A</label>"));
        assert!(html.contains("value=\"B\" checked> B</label>"));
        assert!(html.contains("href=\"/stepwise_analysis/s1\""));
        assert!(html.contains("href=\"/baseline_analysis/B\""));
        assert!(html.contains("<figcaption>Memory Usage by Baseline and Step</figcaption>"));
        assert!(html.contains("src=\"data:image/svg+xml;base64,PHN2Zy8+\""));
    }
}
