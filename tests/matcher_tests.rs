mod common;

use common::{container, image, node, text};
use design_extract_lib::{
    core::types::{BoundingBox, ImageCandidate, MatchMap, MatchPolicy, TextCandidate},
    extract::matcher::{fill_gaps, match_candidates, nearest_image, seed_from_cards, MatchOptions},
};

fn caption(id: &str, text: &str, bbox: BoundingBox) -> TextCandidate {
    TextCandidate {
        node_id: id.to_string(),
        text: text.to_string(),
        bbox,
    }
}

fn artwork(id: &str, bbox: BoundingBox) -> ImageCandidate {
    ImageCandidate {
        node_id: id.to_string(),
        bbox,
    }
}

/// Zero-size box, so its centroid is exactly `(x, y)`.
fn at(x: f64, y: f64) -> BoundingBox {
    BoundingBox::new(x, y, 0.0, 0.0)
}

#[test]
fn caption_directly_above_its_image_is_paired() {
    let texts = vec![caption("1:1", "Квартира", BoundingBox::new(0.0, 0.0, 100.0, 20.0))];
    let images = vec![artwork("42:1", BoundingBox::new(0.0, 20.0, 100.0, 100.0))];

    let matches = match_candidates(&texts, &images, MatchOptions::default());

    assert_eq!(matches.len(), 1);
    assert_eq!(matches.get("42:1").map(String::as_str), Some("Квартира"));
}

#[test]
fn image_beyond_max_distance_is_rejected() {
    let texts = vec![caption("1:1", "Квартира", BoundingBox::new(0.0, 0.0, 100.0, 20.0))];
    // centroid (50, 510) vs caption centroid (50, 10): 500 units apart
    let images = vec![artwork("42:1", BoundingBox::new(0.0, 460.0, 100.0, 100.0))];

    let matches = match_candidates(&texts, &images, MatchOptions::default());

    assert!(matches.is_empty());
}

#[test]
fn distance_equal_to_threshold_is_accepted() {
    let texts = vec![caption("t", "Отпуск", at(0.0, 0.0))];
    let images = vec![artwork("img", at(0.0, 300.0))];

    let matches = match_candidates(&texts, &images, MatchOptions::default());

    assert_eq!(matches.get("img").map(String::as_str), Some("Отпуск"));
}

#[test]
fn nearest_candidate_wins_among_distinct_distances() {
    let text = caption("t", "Ремонт", at(0.0, 0.0));
    let images = vec![
        artwork("far", at(250.0, 0.0)),
        artwork("near", at(0.0, 30.0)),
        artwork("mid", at(100.0, 0.0)),
    ];

    let (best, distance) = nearest_image(&text, &images).expect("nearest image");
    assert_eq!(best.node_id, "near");
    assert_eq!(distance, 30.0);
}

#[test]
fn equal_distance_ties_keep_the_earlier_image() {
    let text = caption("t", "Ремонт", at(0.0, 0.0));
    let images = vec![artwork("left", at(-50.0, 0.0)), artwork("right", at(50.0, 0.0))];

    let (best, _) = nearest_image(&text, &images).expect("nearest image");
    assert_eq!(best.node_id, "left");
}

#[test]
fn empty_inputs_produce_empty_map() {
    let texts = vec![caption("t", "Ремонт", at(0.0, 0.0))];
    let images = vec![artwork("img", at(0.0, 0.0))];

    assert!(match_candidates(&[], &images, MatchOptions::default()).is_empty());
    assert!(match_candidates(&texts, &[], MatchOptions::default()).is_empty());
}

#[test]
fn conflicting_captions_follow_the_configured_policy() {
    let texts = vec![
        caption("a", "Первый", at(0.0, 10.0)),
        caption("b", "Второй", at(0.0, 20.0)),
    ];
    let images = vec![artwork("img", at(0.0, 0.0))];

    let first = match_candidates(&texts, &images, MatchOptions::default());
    assert_eq!(first.get("img").map(String::as_str), Some("Первый"));
    assert_eq!(first.len(), 1);

    let last = match_candidates(
        &texts,
        &images,
        MatchOptions {
            policy: MatchPolicy::LastWins,
            ..MatchOptions::default()
        },
    );
    assert_eq!(last.get("img").map(String::as_str), Some("Второй"));
    assert_eq!(last.len(), 1);
}

#[test]
fn spatial_pass_only_fills_gaps_left_by_seeds() {
    let texts = vec![
        caption("a", "Чужая подпись", at(0.0, 10.0)),
        caption("b", "Дача", at(500.0, 10.0)),
    ];
    let images = vec![artwork("seeded", at(0.0, 0.0)), artwork("free", at(500.0, 0.0))];
    let mut seeds = MatchMap::new();
    seeds.insert("seeded".to_string(), "Свадьба".to_string());

    let matches = fill_gaps(&texts, &images, MatchOptions::default(), seeds);

    assert_eq!(matches.get("seeded").map(String::as_str), Some("Свадьба"));
    assert_eq!(matches.get("free").map(String::as_str), Some("Дача"));
    assert_eq!(matches.keys().collect::<Vec<_>>(), vec!["seeded", "free"]);
}

#[test]
fn card_pass_pairs_first_caption_and_image_per_card() {
    let region = node(container(
        "region",
        "FRAME",
        vec![
            text("anchor", "Выберите цель", 0.0, -50.0, 100.0, 20.0),
            container(
                "card-a",
                "FRAME",
                vec![
                    text("a-title", "Пенсия", 0.0, 0.0, 100.0, 20.0),
                    text("a-sub", "Подзаголовок", 0.0, 20.0, 100.0, 20.0),
                    image("a-img", "RECTANGLE", 5000.0, 5000.0, 10.0, 10.0),
                ],
            ),
            container(
                "card-b",
                "INSTANCE",
                vec![container(
                    "b-1",
                    "GROUP",
                    vec![container(
                        "b-2",
                        "GROUP",
                        vec![image("b-img", "RECTANGLE", 0.0, 0.0, 10.0, 10.0)],
                    )],
                )],
            ),
        ],
    ));

    let seeds = seed_from_cards(&region, 5);
    assert_eq!(seeds.len(), 1);
    assert_eq!(seeds.get("a-img").map(String::as_str), Some("Пенсия"));
}

#[test]
fn card_pass_respects_depth_limit() {
    let region = node(container(
        "region",
        "FRAME",
        vec![container(
            "card",
            "FRAME",
            vec![
                text("title", "Машина", 0.0, 0.0, 10.0, 10.0),
                container(
                    "d1",
                    "GROUP",
                    vec![container("d2", "GROUP", vec![image("deep", "RECTANGLE", 0.0, 0.0, 1.0, 1.0)])],
                ),
            ],
        )],
    ));

    assert_eq!(seed_from_cards(&region, 3).len(), 1);
    assert!(seed_from_cards(&region, 2).is_empty());
}
