use crate::models::Prediction;

/// Width of a full (probability 1.0) bar
const BAR_WIDTH: usize = 40;

/// Headline plus one bar per digit
pub fn render_text(prediction: &Prediction) -> String {
    let mut out = format!("I think you drew: {}\n\n", prediction.digit);
    out.push_str("Probabilities for each digit:\n");
    for (digit, p) in prediction.probabilities.iter().enumerate() {
        let filled = (p * BAR_WIDTH as f32).round() as usize;
        let marker = if digit == prediction.digit as usize { '*' } else { ' ' };
        out.push_str(&format!(
            "{}{} | {:<width$} {:>6.2}%\n",
            marker,
            digit,
            "#".repeat(filled.min(BAR_WIDTH)),
            p * 100.0,
            width = BAR_WIDTH
        ));
    }
    out
}

pub fn render_json(prediction: &Prediction) -> serde_json::Result<String> {
    serde_json::to_string_pretty(prediction)
}
