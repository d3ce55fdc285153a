//! Plain-text rendering of cards and the dashboard for terminal output.
//!
//! Highlighted matches are wrapped in `[` and `]`.

use std::fmt::Write as _;

use crate::card::{ImageBlock, ImageView, RenderedCard};
use crate::dataset::{KeyFindings, SafetyGoal};
use crate::highlight::{Highlighted, Segment};
use crate::stats::DashboardView;

/// Render highlighted text with matches in brackets.
#[must_use]
pub fn highlighted_to_text(text: &Highlighted) -> String {
    text.segments()
        .iter()
        .map(|segment| match segment {
            Segment::Plain(s) => s.clone(),
            Segment::Match(s) => format!("[{s}]"),
        })
        .collect()
}

fn write_image(out: &mut String, block: &ImageBlock) {
    let status = match &block.view {
        ImageView::Loading => "loading...".to_string(),
        ImageView::Visible => "ok".to_string(),
        ImageView::Unavailable { message, hint } => format!("! {message} {hint}"),
    };
    let _ = writeln!(out, "    - {} <{}> {status}", block.label, block.url);
}

/// Render a card as plain text.
#[must_use]
pub fn card_to_text(card: &RenderedCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {}  ({})",
        card.display_id,
        card.header.location_line(),
        card.header.date
    );
    let _ = writeln!(out, "{}", highlighted_to_text(&card.title));
    let _ = writeln!(out);

    let _ = writeln!(out, "  {}", card.detail.label);
    let _ = writeln!(out, "    {}", highlighted_to_text(&card.detail.content));
    for block in &card.detail.images {
        write_image(&mut out, block);
    }

    let _ = writeln!(out, "  {}", card.causes.label);
    for item in &card.causes.items {
        let _ = writeln!(out, "    {}. {}", item.number, item.text);
    }

    let _ = writeln!(out, "  {}", card.countermeasures.label);
    for item in &card.countermeasures.items {
        let _ = writeln!(out, "    * {item}");
    }
    if let Some(effect) = &card.countermeasures.effect {
        let _ = writeln!(out, "    <{}> {}", effect.label, effect.text);
    }

    if let Some(section) = &card.field_reference {
        let _ = writeln!(out, "  {}", section.label);
        for block in &section.images {
            write_image(&mut out, block);
        }
    }
    out
}

/// Render the dashboard as plain text.
#[must_use]
pub fn dashboard_to_text(
    view: &DashboardView,
    findings: &KeyFindings,
    goals: &[SafetyGoal],
) -> String {
    let mut out = String::new();

    if !goals.is_empty() {
        let _ = writeln!(out, "안전성과 목표");
        for goal in goals {
            let _ = writeln!(
                out,
                "  {} / {}: {}",
                goal.category, goal.sub_category, goal.target
            );
        }
        let _ = writeln!(out);
    }

    if !findings.is_empty() {
        let _ = writeln!(out, "사고 주요 유형 및 원인 분석");
        for kind in &findings.types {
            let _ = writeln!(out, "  * {}: {}", kind.title, kind.detail);
        }
        for cause in &findings.causes {
            let _ = writeln!(out, "  - {cause}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "지상안전사고 발생 현황");
    for stat in &view.trend {
        let _ = writeln!(
            out,
            "  {:>6}  운항 {:>8}  발생 {:>3}  환산 {}",
            stat.year,
            stat.flights,
            stat.accidents,
            view.rate_text(stat.rate)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", view.recent_title);
    for tile in &view.recent {
        let _ = writeln!(
            out,
            "  {}  {}  {}",
            tile.year_label, tile.accidents_label, tile.rate_label
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "공항별 사고 분포 (전체 {})", view.total_label());
    for slice in &view.distribution {
        let _ = writeln!(
            out,
            "  {} {}  {}  @({:.1}, {:.1})",
            slice.color, slice.label.name, slice.label.callout, slice.label.x, slice.label.y
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::render;
    use crate::highlight::highlight;
    use crate::record::tests::sample_record;
    use crate::record::{Category, ImageRef};
    use crate::stats::build_dashboard;
    use crate::stats::tests::{airports, yearly};

    #[test]
    fn test_highlighted_to_text() {
        assert_eq!(highlighted_to_text(&highlight("a Tug b tug", "TUG")), "a [Tug] b [tug]");
        assert_eq!(highlighted_to_text(&highlight("plain", "")), "plain");
    }

    #[test]
    fn test_card_to_text() {
        let mut record = sample_record(Category::General, 102);
        record.images = vec![ImageRef::new("image/2-01.png")];
        record.effect = Some("재발 없음".to_string());
        let text = card_to_text(&render(&record, "접촉"));

        assert!(text.starts_with("[사례-2] 김포 · (주)샤프에비에.."));
        assert!(text.contains("[접촉]"));
        assert!(text.contains("1. 사주경계 미흡"));
        assert!(text.contains("첨부사진 1 <image/2-01.png> loading..."));
        assert!(text.contains("<Key Effect> 재발 없음"));
        assert!(!text.contains("Field Reference"));
    }

    #[test]
    fn test_dashboard_to_text() {
        let view = build_dashboard(&yearly(), &airports());
        let text = dashboard_to_text(&view, &KeyFindings::default(), &[]);
        assert!(text.contains("최근 3개년 사고 추이"));
        assert!(text.contains("2019  운항   514837  발생   7  환산 0.136"));
        assert!(!text.contains("안전성과 목표"));
        assert!(text.contains("2024년  24건  0.501"));
        assert!(text.contains("35건(45%)"));
        assert!(text.contains("전체 76건"));
        assert!(!text.contains("사고 주요 유형"));
    }

    #[test]
    fn test_dashboard_to_text_goals_and_tied_rates() {
        let mut series = yearly();
        series[0].rate = 0.5625;
        let view = build_dashboard(&series, &airports());
        let goals = vec![SafetyGoal {
            category: "지상안전사고".to_string(),
            sub_category: "차량-차량·장비·시설간 접촉".to_string(),
            target: "0.291건".to_string(),
        }];
        let text = dashboard_to_text(&view, &KeyFindings::default(), &goals);
        assert!(text.starts_with("안전성과 목표\n"));
        assert!(text.contains("지상안전사고 / 차량-차량·장비·시설간 접촉: 0.291건"));
        assert!(text.contains("환산 0.563"));
    }
}
