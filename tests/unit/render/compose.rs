use super::*;
use crate::render::surface::FontAsset;
use crate::render::test_support::{Op, RecordingSurface, tagged_image};
use crate::resolve::parts::PartKey;
use crate::scene::creature::ScoreSet;

/// Tag each part by a distinct image width so recorded draws identify the layer.
fn part_width(part: PartKey) -> u32 {
    10 + part.index() as u32
}

fn slots_with(parts: &[PartKey], background: bool) -> SlotTable {
    let mut slots = SlotTable::default();
    for &p in parts {
        let slot = slots.get_mut(SlotKey::Part(p));
        *slot = loaded_slot(tagged_image(part_width(p), 1));
    }
    if background {
        *slots.get_mut(SlotKey::Background) = loaded_slot(tagged_image(100, 100));
    }
    slots
}

fn loaded_slot(img: PreparedImage) -> crate::assets::tracker::AssetSlot {
    crate::assets::tracker::AssetSlot::loaded_for_test(img)
}

fn view<'a>(
    req: Option<&'a GenerationRequest>,
    slots: &'a SlotTable,
    fallback: Option<&'a PreparedImage>,
    fonts: &'a FontBook,
) -> FrameView<'a> {
    FrameView {
        request: req,
        slots,
        fallback_background: fallback,
        fonts,
    }
}

#[test]
fn placement_presets_by_kind() {
    let t = PlacementTable::default();
    assert_eq!(placement_for(CreatureKind::Wolf, &t), t.large);
    assert_eq!(placement_for(CreatureKind::Spider, &t), t.large);
    for k in [
        CreatureKind::Cat,
        CreatureKind::Demon,
        CreatureKind::Mummy,
        CreatureKind::Lava,
    ] {
        assert_eq!(placement_for(k, &t), t.standard);
    }
}

#[test]
fn placement_rect_scales_canvas() {
    let r = PlacementTable::default().large.rect(Canvas {
        width: 1000,
        height: 2000,
    });
    assert_eq!(r, Rect::new(200.0, 300.0, 850.0, 1600.0));
}

#[test]
fn draw_order_is_fixed_regardless_of_which_parts_loaded() {
    let req = GenerationRequest::new(CreatureKind::Cat, ScoreSet::default());
    let fonts = FontBook::default();
    let layout = CardLayout::default();

    let all = slots_with(&PartKey::ALL, false);
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &all, None, &fonts), &layout).unwrap();
    let widths: Vec<u32> = s.image_sizes().into_iter().map(|(w, _)| w).collect();
    let expected: Vec<u32> = DRAW_ORDER.iter().map(|&p| part_width(p)).collect();
    assert_eq!(widths, expected);

    // Head and one leg only: head still lands last.
    let partial = slots_with(&[PartKey::Head, PartKey::RightLeg], false);
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &partial, None, &fonts), &layout).unwrap();
    let widths: Vec<u32> = s.image_sizes().into_iter().map(|(w, _)| w).collect();
    assert_eq!(
        widths,
        vec![part_width(PartKey::RightLeg), part_width(PartKey::Head)]
    );
}

#[test]
fn layers_use_kind_placement() {
    let req = GenerationRequest::new(CreatureKind::Spider, ScoreSet::default());
    let fonts = FontBook::default();
    let layout = CardLayout::default();
    let slots = slots_with(&[PartKey::Torso], false);
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &slots, None, &fonts), &layout).unwrap();

    let dest = s
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Image { dest, .. } => Some(*dest),
            _ => None,
        })
        .unwrap();
    assert_eq!(dest, layout.placements.large.rect(s.canvas));
}

#[test]
fn background_prefers_finalcard_then_fallback_then_clear() {
    let req = GenerationRequest::new(CreatureKind::Wolf, ScoreSet::default());
    let fonts = FontBook::default();
    let layout = CardLayout::default();
    let fallback = tagged_image(50, 50);

    let with_bg = slots_with(&[], true);
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &with_bg, Some(&fallback), &fonts), &layout).unwrap();
    assert_eq!(s.ops[0], Op::Clear([0, 0, 0, 255]));
    assert_eq!(s.image_sizes(), vec![(100, 100)]);

    let no_bg = slots_with(&[], false);
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &no_bg, Some(&fallback), &fonts), &layout).unwrap();
    assert_eq!(s.image_sizes(), vec![(50, 50)]);

    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &no_bg, None, &fonts), &layout).unwrap();
    assert!(s.image_sizes().is_empty());
    assert_eq!(s.ops[0], Op::Clear([0, 0, 0, 255]));
}

#[test]
fn idle_frame_shows_prompt_only() {
    let fonts = FontBook::default();
    let layout = CardLayout::default();
    let slots = slots_with(&PartKey::ALL, false);
    let fallback = tagged_image(50, 50);
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(None, &slots, Some(&fallback), &fonts), &layout).unwrap();

    assert_eq!(s.image_sizes(), vec![(50, 50)]);
    assert_eq!(s.all_texts(), vec![IDLE_PROMPT.to_string()]);
}

#[test]
fn scores_and_total_are_drawn_with_glow() {
    let req = GenerationRequest::new(CreatureKind::Wolf, ScoreSet::new(1, 20, 300, 4000));
    let fonts = FontBook {
        display: Some(FontAsset {
            key: "display".to_string(),
            bytes: std::sync::Arc::new(vec![]),
        }),
        body: None,
    };
    let layout = CardLayout::default();
    let slots = SlotTable::default();
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &slots, None, &fonts), &layout).unwrap();

    let main = s.texts_with_rgba([255, 255, 255, 200]);
    assert!(main.contains(&"4321".to_string()));
    assert!(main.contains(&"Eye Score: 1".to_string()));
    assert!(main.contains(&"Brain Score: 20".to_string()));
    assert!(main.contains(&"Stomach Score: 4000".to_string()));
    assert_eq!(
        s.texts_with_rgba([255, 255, 255, 191]),
        vec!["Bleeding Score: 300".to_string()]
    );

    // 5 labels x (120 glow copies + 1 main copy).
    let glow_count = s.texts_with_rgba([255, 255, 255, 5]).len();
    assert_eq!(glow_count, 5 * 120);

    let total_font = s.ops.iter().find_map(|op| match op {
        Op::Text { text, font, .. } if text == "4321" => Some(font.clone()),
        _ => None,
    });
    assert_eq!(total_font, Some(Some("display".to_string())));
}

#[test]
fn zero_scores_total_zero() {
    let req = GenerationRequest::new(CreatureKind::Wolf, ScoreSet::default());
    let fonts = FontBook::default();
    let slots = SlotTable::default();
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &slots, None, &fonts), &CardLayout::default()).unwrap();
    assert!(s.texts_with_rgba([255, 255, 255, 200]).contains(&"0".to_string()));
}

#[test]
fn status_line_reflects_background_slot_only() {
    let req = GenerationRequest::new(CreatureKind::Cat, ScoreSet::default());
    let fonts = FontBook::default();
    let layout = CardLayout::default();

    let mut slots = SlotTable::default();
    *slots.get_mut(SlotKey::Background) = crate::assets::tracker::AssetSlot::loading_for_test();
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &slots, None, &fonts), &layout).unwrap();
    assert_eq!(
        s.texts_with_rgba([255, 255, 255, 255]),
        vec![STATUS_LOADING.to_string()]
    );

    let mut slots = SlotTable::default();
    *slots.get_mut(SlotKey::Background) =
        crate::assets::tracker::AssetSlot::failed_for_test("./media/cat/cat-finalcard.png");
    *slots.get_mut(SlotKey::Part(PartKey::Head)) =
        crate::assets::tracker::AssetSlot::failed_for_test("./media/cat/bad/bad-head.png");
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &slots, None, &fonts), &layout).unwrap();
    assert_eq!(
        s.texts_with_rgba([255, 100, 100, 255]),
        vec![STATUS_MISSING.to_string()]
    );

    // A failed part alone shows nothing.
    let mut slots = SlotTable::default();
    *slots.get_mut(SlotKey::Part(PartKey::Head)) =
        crate::assets::tracker::AssetSlot::failed_for_test("./media/cat/bad/bad-head.png");
    let mut s = RecordingSurface::new(1078, 1915);
    render(&mut s, &view(Some(&req), &slots, None, &fonts), &layout).unwrap();
    assert!(!s.all_texts().iter().any(|t| t == STATUS_MISSING || t == STATUS_LOADING));
}
