// Unit tests for Sponsor Match scoring

use sponsor_match::core::{
    affinity::audience_fit,
    filters::{category_preference_score, needs_overlap_score},
    scoring::{calculate_match_score, NEUTRAL_SCORE},
    tags::parse_tags,
};
use sponsor_match::models::{
    Event, EventCategory, MatchBand, ScoringWeights, Sponsor, SponsorshipNeed,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn create_event(category: &str, needs: &[&str], audience: Option<i64>) -> Event {
    Event {
        id: "event_1".to_string(),
        organizer_id: Some("organizer_1".to_string()),
        title: "Spring Hackathon".to_string(),
        description: None,
        category: category.to_string(),
        expected_audience: audience,
        is_online: false,
        sponsorship_needs: strings(needs),
        status: "published".to_string(),
        event_date: None,
        location: Some("Main campus".to_string()),
        created_at: None,
    }
}

fn create_sponsor(industry: Option<&str>, preferred: &[&str], offered: &[&str]) -> Sponsor {
    Sponsor {
        id: "sponsor_1".to_string(),
        company_name: "Acme Corp".to_string(),
        industry: industry.map(str::to_string),
        description: None,
        preferred_event_types: strings(preferred),
        offered_support: strings(offered),
        audience_min: Some(100),
        audience_max: Some(1000),
        profile_completion: Some(90),
    }
}

fn score(event: &Event, sponsor: &Sponsor) -> u8 {
    calculate_match_score(event, sponsor, &ScoringWeights::default()).0
}

#[test]
fn test_score_bounds_across_inputs() {
    let categories = ["tech", "culture", "sports", "workshop", "seminar", "conference", "other", "bogus", ""];
    let industries = [Some("technology"), Some("finance"), Some("retail"), Some("mining"), None];
    let audiences = [None, Some(-5), Some(0), Some(1), Some(500), Some(10_000_000)];

    for category in categories {
        for industry in industries {
            for audience in audiences {
                let event = create_event(category, &["monetary", "venue"], audience);
                let sponsor = create_sponsor(industry, &["tech", "sports"], &["venue"]);
                let s = score(&event, &sponsor);
                assert!(s <= 100, "score {} out of range", s);
            }
        }
    }
}

#[test]
fn test_scoring_is_deterministic() {
    let mut event = create_event("workshop", &["swag", "product", "media"], Some(250));
    event.description = Some("Hands-on robotics workshop for first-year students".to_string());
    let mut sponsor = create_sponsor(Some("education"), &["workshop", "seminar"], &["product", "swag"]);
    sponsor.description = Some("We supply robotics kits to universities".to_string());

    let first = calculate_match_score(&event, &sponsor, &ScoringWeights::default());
    let second = calculate_match_score(&event, &sponsor, &ScoringWeights::default());
    assert_eq!(first, second);
}

#[test]
fn test_tag_order_does_not_change_score() {
    let event_a = create_event("tech", &["monetary", "swag", "venue"], Some(300));
    let event_b = create_event("tech", &["venue", "monetary", "swag"], Some(300));
    let sponsor_a = create_sponsor(Some("technology"), &["tech", "workshop"], &["swag", "venue"]);
    let sponsor_b = create_sponsor(Some("technology"), &["workshop", "tech"], &["venue", "swag"]);

    assert_eq!(score(&event_a, &sponsor_a), score(&event_b, &sponsor_b));
}

#[test]
fn test_more_shared_needs_never_lowers_score() {
    let event = create_event("tech", &["monetary", "swag", "media", "venue"], Some(300));

    let offerings: [&[&str]; 5] = [
        &["product"],
        &["product", "swag"],
        &["product", "swag", "media"],
        &["product", "swag", "media", "venue"],
        &["product", "swag", "media", "venue", "monetary"],
    ];

    let mut previous = 0;
    for offered in offerings {
        let s = score(&event, &create_sponsor(Some("technology"), &["tech"], offered));
        assert!(s >= previous, "score dropped from {} to {} with {:?}", previous, s, offered);
        previous = s;
    }
}

#[test]
fn test_preferring_the_category_never_lowers_score() {
    let event = create_event("culture", &["swag"], Some(300));

    let without = score(&event, &create_sponsor(Some("retail"), &["sports"], &["swag"]));
    let with = score(&event, &create_sponsor(Some("retail"), &["sports", "culture"], &["swag"]));
    assert!(with >= without);

    let unset = score(&event, &create_sponsor(Some("retail"), &[], &["swag"]));
    let only = score(&event, &create_sponsor(Some("retail"), &["culture"], &["swag"]));
    assert!(only >= unset);
}

#[test]
fn test_more_shared_needs_never_lowers_score_from_malformed_offer() {
    let event = create_event("tech", &["monetary", "swag", "media", "venue"], Some(300));

    let offerings: [&[&str]; 5] = [
        &["bitcoin"],
        &["bitcoin", "swag"],
        &["bitcoin", "swag", "media"],
        &["bitcoin", "swag", "media", "venue"],
        &["bitcoin", "swag", "media", "venue", "monetary"],
    ];

    let mut previous = 0;
    for offered in offerings {
        let s = score(&event, &create_sponsor(Some("technology"), &["tech"], offered));
        assert!(s >= previous, "score dropped from {} to {} with {:?}", previous, s, offered);
        previous = s;
    }

    // A garbage-only offer scores the same as no offer at all
    let garbage = score(&event, &create_sponsor(Some("technology"), &["tech"], &["bitcoin"]));
    let nothing = score(&event, &create_sponsor(Some("technology"), &["tech"], &[]));
    assert_eq!(garbage, nothing);
}

#[test]
fn test_more_shared_needs_never_lowers_score_from_malformed_needs() {
    let sponsor = create_sponsor(Some("technology"), &["tech"], &["swag", "venue"]);

    let garbage = score(&create_event("tech", &["gold"], Some(300)), &sponsor);
    let one = score(&create_event("tech", &["gold", "swag"], Some(300)), &sponsor);
    let both = score(&create_event("tech", &["gold", "swag", "venue"], Some(300)), &sponsor);
    assert!(one >= garbage, "score dropped from {} to {}", garbage, one);
    assert!(both >= one, "score dropped from {} to {}", one, both);
}

#[test]
fn test_preferring_the_category_never_lowers_score_from_malformed_preferences() {
    let event = create_event("culture", &["swag"], Some(300));

    let garbage = score(&event, &create_sponsor(Some("retail"), &["raves"], &["swag"]));
    let with = score(&event, &create_sponsor(Some("retail"), &["raves", "culture"], &["swag"]));
    assert!(with >= garbage, "score dropped from {} to {}", garbage, with);

    let unset = score(&event, &create_sponsor(Some("retail"), &[], &["swag"]));
    assert_eq!(garbage, unset);
}

#[test]
fn test_empty_preferences_are_neutral_not_zero() {
    let preferred = parse_tags::<EventCategory>(&[]);
    assert_eq!(category_preference_score(Some(EventCategory::Tech), &preferred), Some(0.5));

    let event = create_event("tech", &["swag"], Some(300));
    let sponsor = create_sponsor(Some("technology"), &[], &["swag"]);
    let (s, breakdown, _) = calculate_match_score(&event, &sponsor, &ScoringWeights::default());
    assert_eq!(breakdown.category, Some(0.5));
    assert!(s > 0);
}

#[test]
fn test_all_empty_pair_scores_neutral_baseline() {
    let mut event = create_event("", &[], None);
    event.location = None;
    let mut sponsor = create_sponsor(None, &[], &[]);
    sponsor.audience_min = None;
    sponsor.audience_max = None;

    assert_eq!(score(&event, &sponsor), NEUTRAL_SCORE);
}

#[test]
fn test_needs_overlap_values() {
    let needs = parse_tags::<SponsorshipNeed>(&strings(&["monetary", "swag"]));
    let offered = parse_tags::<SponsorshipNeed>(&strings(&["swag"]));
    assert_eq!(needs_overlap_score(&needs, &offered), Some(0.75));

    let nothing = parse_tags::<SponsorshipNeed>(&strings(&["venue"]));
    assert_eq!(needs_overlap_score(&needs, &nothing), Some(0.25));
}

#[test]
fn test_audience_fit_shape() {
    assert_eq!(audience_fit(Some(500), Some(100), Some(1000)), 1.0);
    let just_below = audience_fit(Some(90), Some(100), Some(1000));
    let well_below = audience_fit(Some(30), Some(100), Some(1000));
    assert!(just_below > well_below);
    assert!(well_below > 0.0);
}

#[test]
fn test_custom_weights_shift_score() {
    let event = create_event("sports", &["swag"], Some(300));
    let sponsor = create_sponsor(Some("technology"), &["tech"], &["swag"]);

    let category_only = ScoringWeights {
        category: 1.0,
        needs: 0.0,
        industry: 0.0,
        audience: 0.0,
        description: 0.0,
    };
    let audience_only = ScoringWeights {
        category: 0.0,
        audience: 1.0,
        ..category_only
    };

    assert_eq!(calculate_match_score(&event, &sponsor, &category_only).0, 15);
    assert_eq!(calculate_match_score(&event, &sponsor, &audience_only).0, 100);
}

#[test]
fn test_match_bands() {
    assert_eq!(MatchBand::from_score(100), MatchBand::Excellent);
    assert_eq!(MatchBand::from_score(80), MatchBand::Excellent);
    assert_eq!(MatchBand::from_score(79), MatchBand::Good);
    assert_eq!(MatchBand::from_score(60), MatchBand::Good);
    assert_eq!(MatchBand::from_score(59), MatchBand::Fair);
    assert_eq!(MatchBand::from_score(0), MatchBand::Fair);
}
