use super::*;

#[test]
fn test_in_order_items_release_immediately() {
    let mut sequencer = Sequencer::new();

    assert_eq!(sequencer.insert(0, "a"), vec!["a"]);
    assert_eq!(sequencer.insert(1, "b"), vec!["b"]);
    assert_eq!(sequencer.next_expected(), 2);
    assert!(sequencer.is_empty());
}

#[test]
fn test_out_of_order_items_wait_for_gap() {
    let mut sequencer = Sequencer::new();

    assert!(sequencer.insert(2, "c").is_empty());
    assert!(sequencer.insert(1, "b").is_empty());
    assert_eq!(sequencer.pending(), 2);

    assert_eq!(sequencer.insert(0, "a"), vec!["a", "b", "c"]);
    assert_eq!(sequencer.next_expected(), 3);
    assert!(sequencer.is_empty());
}

#[test]
fn test_partial_run_release() {
    let mut sequencer = Sequencer::default();

    assert!(sequencer.insert(1, 1).is_empty());
    assert!(sequencer.insert(3, 3).is_empty());
    assert_eq!(sequencer.insert(0, 0), vec![0, 1]);
    assert_eq!(sequencer.pending(), 1);
    assert_eq!(sequencer.insert(2, 2), vec![2, 3]);
}
