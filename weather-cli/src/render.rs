use chrono::{DateTime, Local, Utc};
use std::io::Write;

use wxlookup_core::{Presenter, Theme, UiState, WeatherDisplay};

/// Class list of the page root. Applying a theme replaces every class.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RootClassList {
    classes: Vec<String>,
}

impl RootClassList {
    pub fn apply(&mut self, theme: Theme) {
        self.classes.clear();
        self.classes.push(theme.css_class().to_string());
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }
}

/// How much of the widget a render draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Search box, indicators, spinner and details.
    Interactive,
    /// Details only.
    Summary,
    /// Nothing; alerts are still written.
    AlertsOnly,
}

/// Draws the widget as plain text.
pub struct TerminalPresenter<W: Write> {
    out: W,
    root: RootClassList,
    layout: Layout,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, layout: Layout) -> Self {
        Self {
            out,
            root: RootClassList::default(),
            layout,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_state(&mut self, state: &UiState) -> std::io::Result<()> {
        match self.layout {
            Layout::AlertsOnly => return Ok(()),
            Layout::Summary if state.is_loading => return Ok(()),
            Layout::Interactive if state.is_loading => {
                return writeln!(self.out, "⏳ Loading...");
            }
            _ => {}
        }

        if self.layout == Layout::Interactive {
            let query = match state.query.as_str() {
                "" => "Enter City...",
                typed => typed,
            };
            let mic = if state.is_listening { "🎙 listening" } else { "🎤" };
            writeln!(self.out, "[ {query} ]  (Search)  {mic}")?;
        }

        if let Some(result) = &state.result {
            let theme = self.root.class_name();
            write_details(&mut self.out, &result.display(), &theme)?;
        }

        self.out.flush()
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn alert(&mut self, message: &str) {
        let _ = writeln!(self.out, "⚠ {message}");
    }

    fn unavailable(&mut self, reason: &str) {
        tracing::debug!(%reason, "lookup unavailable");
        let _ = writeln!(self.out, "✖ Weather service unavailable, try again later.");
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.root.apply(theme);
    }

    fn render(&mut self, state: &UiState) {
        if let Err(e) = self.write_state(state) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }
}

pub fn write_details(
    out: &mut impl Write,
    d: &WeatherDisplay,
    theme: &str,
) -> std::io::Result<()> {
    let place = match (&d.location_name, &d.country) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.clone(),
        _ => "Unknown location".to_string(),
    };

    writeln!(out, "── {place} ── [{theme}]")?;

    if let Some(when) = d.observation_time {
        writeln!(out, "  as of       {}", local_time(when, "%a %d %b %Y %H:%M"))?;
    }
    if let Some(t) = d.temperature_c {
        writeln!(out, "  temperature {t:.1} °C")?;
    }
    if let Some(t) = d.feels_like_c {
        writeln!(out, "  feels like  {t:.1} °C")?;
    }
    if let (Some(lo), Some(hi)) = (d.temp_min_c, d.temp_max_c) {
        writeln!(out, "  min / max   {lo:.1} / {hi:.1} °C")?;
    }
    match (&d.condition, &d.description) {
        (Some(main), Some(desc)) => writeln!(out, "  conditions  {main} ({desc})")?,
        (Some(main), None) => writeln!(out, "  conditions  {main}")?,
        (None, Some(desc)) => writeln!(out, "  conditions  {desc}")?,
        (None, None) => {}
    }
    if let Some(h) = d.humidity_pct {
        writeln!(out, "  humidity    {h:.0}%")?;
    }
    if let Some(p) = d.pressure_hpa {
        writeln!(out, "  pressure    {p:.0} hPa")?;
    }
    if let Some(w) = d.wind_speed_mps {
        writeln!(out, "  wind        {w:.1} m/s")?;
    }
    if let Some(v) = d.visibility_m {
        writeln!(out, "  visibility  {:.1} km", v / 1000.0)?;
    }
    if let (Some(rise), Some(set)) = (d.sunrise, d.sunset) {
        let (rise, set) = (local_time(rise, "%H:%M"), local_time(set, "%H:%M"));
        writeln!(out, "  sun         ↑ {rise}  ↓ {set}")?;
    }

    Ok(())
}

fn local_time(t: DateTime<Utc>, fmt: &str) -> String {
    t.with_timezone(&Local).format(fmt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wxlookup_core::WeatherResult;

    fn output(p: TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(p.into_inner()).expect("utf8")
    }

    #[test]
    fn applying_a_theme_replaces_all_classes() {
        let mut root = RootClassList::default();
        root.apply(Theme::Rain);
        root.apply(Theme::Clear);
        assert_eq!(root.class_name(), "clear");

        root.apply(Theme::Clear);
        assert_eq!(root.class_name(), "clear");
    }

    #[test]
    fn loading_shows_spinner_only() {
        let mut p = TerminalPresenter::new(Vec::new(), Layout::Interactive);
        p.render(&UiState { is_loading: true, ..UiState::default() });
        assert_eq!(output(p), "⏳ Loading...\n");
    }

    #[test]
    fn empty_search_box_shows_placeholder_and_mic_state() {
        let mut p = TerminalPresenter::new(Vec::new(), Layout::Interactive);
        p.render(&UiState { is_listening: true, ..UiState::default() });
        let text = output(p);
        assert!(text.contains("[ Enter City... ]"));
        assert!(text.contains("listening"));
    }

    #[test]
    fn result_renders_with_theme() {
        let mut p = TerminalPresenter::new(Vec::new(), Layout::Summary);
        p.apply_theme(Theme::Clouds);
        let result = WeatherResult::from_payload(json!({
            "cod": 200,
            "name": "Pune",
            "main": { "temp": 27.04, "humidity": 40 },
            "weather": [{ "main": "Clouds", "description": "scattered clouds" }],
            "sys": { "country": "IN" }
        }));
        p.render(&UiState { result: Some(result), ..UiState::default() });

        let text = output(p);
        assert!(text.contains("Pune, IN"));
        assert!(text.contains("[clouds]"));
        assert!(text.contains("27.0 °C"));
        assert!(text.contains("Clouds (scattered clouds)"));
        assert!(text.contains("40%"));
    }

    #[test]
    fn fractional_readings_render_rounded() {
        let display = WeatherResult::from_payload(json!({
            "cod": 200,
            "name": "Paris",
            "visibility": 9500,
            "main": { "temp": 12.5, "pressure": 1012.6, "humidity": 80.7 }
        }))
        .display();

        let mut out = Vec::new();
        write_details(&mut out, &display, "unknown").expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("12.5 °C"));
        assert!(text.contains("1013 hPa"));
        assert!(text.contains("81%"));
        assert!(text.contains("9.5 km"));
    }

    #[test]
    fn alerts_only_layout_draws_no_details() {
        let mut p = TerminalPresenter::new(Vec::new(), Layout::AlertsOnly);
        let result = WeatherResult::from_payload(json!({ "cod": 200, "name": "Pune" }));
        p.render(&UiState { result: Some(result), ..UiState::default() });
        p.alert("city not found");
        assert_eq!(output(p), "⚠ city not found\n");
    }

    #[test]
    fn alerts_and_unavailable_are_distinct() {
        let mut p = TerminalPresenter::new(Vec::new(), Layout::Summary);
        p.alert("city not found");
        p.unavailable("connection refused");
        let text = output(p);
        assert!(text.contains("⚠ city not found"));
        assert!(text.contains("✖ Weather service unavailable"));
    }
}
