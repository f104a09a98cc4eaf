use dayplan_core::{PillStatusTrack, SlotCalendar, UnknownSlot};

#[test]
fn session_starts_with_one_not_taken_token_per_slot() {
    let calendar = SlotCalendar::standard();
    let track = PillStatusTrack::new(&calendar);

    assert_eq!(track.len(), calendar.len());
    for (position, token) in track.tokens().iter().enumerate() {
        assert_eq!(token.slot_index, position);
        assert!(!token.taken);
    }
}

#[test]
fn set_taken_round_trips_to_original_state() {
    let mut track = PillStatusTrack::new(&SlotCalendar::standard());

    track.set_taken(5, true).unwrap();
    assert!(track.get(5).unwrap().taken);

    track.set_taken(5, false).unwrap();
    assert!(!track.get(5).unwrap().taken);
}

#[test]
fn repeated_set_is_a_stable_no_op() {
    let mut track = PillStatusTrack::new(&SlotCalendar::standard());

    track.set_taken(3, true).unwrap();
    assert!(track.get(3).unwrap().taken);

    track.set_taken(3, true).unwrap();
    assert!(track.get(3).unwrap().taken);
}

#[test]
fn setting_one_token_leaves_the_others_alone() {
    let mut track = PillStatusTrack::new(&SlotCalendar::standard());

    track.set_taken(0, true).unwrap();
    assert!(track.get(0).unwrap().taken);
    assert!(track
        .tokens()
        .iter()
        .skip(1)
        .all(|token| !token.taken));
}

#[test]
fn out_of_range_index_is_rejected_without_mutation() {
    let calendar = SlotCalendar::standard();
    let mut track = PillStatusTrack::new(&calendar);

    let err = track.set_taken(calendar.len(), true).unwrap_err();
    assert_eq!(
        err,
        UnknownSlot {
            slot_index: calendar.len(),
            slot_count: calendar.len(),
        }
    );
    assert!(track.get(calendar.len()).is_none());
    assert!(track.tokens().iter().all(|token| !token.taken));
}

#[test]
fn new_session_resets_all_tokens() {
    let calendar = SlotCalendar::standard();
    let mut track = PillStatusTrack::new(&calendar);
    track.set_taken(2, true).unwrap();

    // Pill state is session-scoped by design; a reload starts clean.
    let fresh = PillStatusTrack::new(&calendar);
    assert!(fresh.tokens().iter().all(|token| !token.taken));
}
