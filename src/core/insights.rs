use super::types::{ScenarioRecord, StatusColor};

const EARLY_RETIREMENT_HIGHLIGHT_YEARS: f64 = 5.0;
const FIRE_ALMOST_THERE_GAP: f64 = 20.0;

pub fn status_insights(record: &ScenarioRecord) -> Vec<String> {
    let mut insights = Vec::new();
    let early = record.early_retirement_ready.unwrap_or(0.0);
    let late = record.late_retirement.unwrap_or(0.0);

    match record.status() {
        StatusColor::Green => {
            insights.push("Great job! Your retirement planning is on track.".to_string());
            if early > EARLY_RETIREMENT_HIGHLIGHT_YEARS {
                insights.push(format!("Excellent! You could retire {early:.1} years early."));
            }
        }
        StatusColor::Yellow => {
            insights.push(
                "Your plan needs some adjustments. Consider increasing savings or extending timeline."
                    .to_string(),
            );
            if late > 0.0 {
                insights.push(format!(
                    "Current plan might delay retirement by {late:.1} years."
                ));
            }
        }
        StatusColor::Red => {
            insights.push(
                "Your current plan needs significant changes to meet retirement goals."
                    .to_string(),
            );
            if late > 0.0 {
                insights.push(format!(
                    "Consider increasing savings or working {late:.1} years longer."
                ));
            }
        }
    }

    let fire_percentage = record.fire_percentage.unwrap_or(0.0);
    if record.fire_achievable.unwrap_or(false) {
        insights.push(format!(
            "FIRE achievable! You're {fire_percentage:.1}% ready for financial independence."
        ));
    } else {
        let gap = 100.0 - fire_percentage;
        if gap < FIRE_ALMOST_THERE_GAP {
            insights.push(format!("Almost there! You need {gap:.1}% more to reach FIRE."));
        } else {
            insights.push(
                "To reach FIRE, focus on increasing savings or reducing expenses.".to_string(),
            );
        }
    }

    let fire_grade = record.fire_grade.as_deref().unwrap_or_default().trim();
    let traditional_grade = record
        .traditional_grade
        .as_deref()
        .unwrap_or_default()
        .trim();
    let strong = |grade: &str| grade == "A+" || grade == "A";
    if fire_grade == "A+" && traditional_grade == "A+" {
        insights.push("Perfect score! You're a retirement planning champion.".to_string());
    } else if strong(fire_grade) || strong(traditional_grade) {
        insights.push("Strong performance in retirement planning!".to_string());
    }

    insights
}

pub fn recommendations(status: StatusColor) -> Vec<&'static str> {
    match status {
        StatusColor::Red => vec![
            "Increase monthly savings",
            "Review and reduce expenses",
            "Consider later retirement",
            "Explore income opportunities",
        ],
        StatusColor::Yellow => vec![
            "Optimize investment strategy",
            "Regular plan reviews",
            "Utilize tax-advantaged accounts",
        ],
        StatusColor::Green => vec![
            "Continue current plan",
            "Conduct annual reviews",
            "Consider accelerating FIRE goals",
        ],
    }
}

/// Yen amount with 億円 / 万円 suffixes.
pub fn format_yen(amount: f64) -> String {
    if !amount.is_finite() || amount == 0.0 {
        return "¥0".to_string();
    }
    if amount >= 100_000_000.0 {
        return format!("¥{:.1}億円", amount / 100_000_000.0);
    }
    if amount >= 10_000.0 {
        return format!("¥{:.0}万円", amount / 10_000.0);
    }
    format!("¥{}", group_thousands(amount.round() as i64))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{record_for, sample_profile};

    #[test]
    fn green_record_with_large_early_margin() {
        let mut record = record_for(&sample_profile());
        record.early_retirement_ready = Some(6.4);
        record.fire_achievable = Some(true);
        record.fire_percentage = Some(130.0);
        record.fire_grade = Some("A+".to_string());
        record.traditional_grade = Some("A+".to_string());

        let insights = status_insights(&record);
        assert_eq!(
            insights,
            vec![
                "Great job! Your retirement planning is on track.",
                "Excellent! You could retire 6.4 years early.",
                "FIRE achievable! You're 130.0% ready for financial independence.",
                "Perfect score! You're a retirement planning champion.",
            ]
        );
    }

    #[test]
    fn yellow_record_near_fire_with_delay() {
        let mut record = record_for(&sample_profile());
        record.status_color = Some("yellow".to_string());
        record.late_retirement = Some(3.0);
        record.fire_percentage = Some(85.0);
        record.fire_grade = Some("C".to_string());
        record.traditional_grade = Some("A".to_string());

        let insights = status_insights(&record);
        assert!(insights.contains(&"Current plan might delay retirement by 3.0 years.".to_string()));
        assert!(insights.contains(&"Almost there! You need 15.0% more to reach FIRE.".to_string()));
        assert!(insights.contains(&"Strong performance in retirement planning!".to_string()));
    }

    #[test]
    fn red_record_far_from_fire() {
        let mut record = record_for(&sample_profile());
        record.status_color = Some("red".to_string());
        record.late_retirement = Some(7.5);
        record.fire_percentage = None;
        record.fire_grade = Some("D".to_string());
        record.traditional_grade = Some("C".to_string());

        let insights = status_insights(&record);
        assert_eq!(insights.len(), 3);
        assert_eq!(
            insights[1],
            "Consider increasing savings or working 7.5 years longer."
        );
        assert_eq!(
            insights[2],
            "To reach FIRE, focus on increasing savings or reducing expenses."
        );
    }

    #[test]
    fn recommendations_follow_status() {
        assert_eq!(recommendations(StatusColor::Red).len(), 4);
        assert_eq!(recommendations(StatusColor::Green)[0], "Continue current plan");
    }

    #[test]
    fn yen_formatting_uses_japanese_units() {
        assert_eq!(format_yen(0.0), "¥0");
        assert_eq!(format_yen(f64::NAN), "¥0");
        assert_eq!(format_yen(9_876.4), "¥9,876");
        assert_eq!(format_yen(2_500_000.0), "¥250万円");
        assert_eq!(format_yen(150_000_000.0), "¥1.5億円");
    }
}
