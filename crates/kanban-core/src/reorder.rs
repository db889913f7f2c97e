//! Sequence reordering primitives shared by boards, lists and cards.

use crate::model::{Board, Card, CardLocation};

/// Move the element at `from` so that it ends up at index `to`.
///
/// Follows splice semantics: `to` is clamped to the end of the sequence.
/// Returns false when `from` is out of range or the move would not change
/// the order.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        log::warn!("move_item: source index {} out of range (len {})", from, items.len());
        return false;
    }
    let to = to.min(items.len() - 1);
    if from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Move a card within or across the lists of one board.
///
/// Both affected sequences are derived from the same board value, so the
/// card is never duplicated or dropped. Returns false when either list is
/// missing, the source index is out of range, or nothing moved.
pub fn move_card(board: &mut Board, source: CardLocation, destination: CardLocation) -> bool {
    let Some(from_list) = board.list_index(source.list_id) else {
        log::warn!("move_card: source list {} not on board {}", source.list_id, board.id);
        return false;
    };
    let Some(to_list) = board.list_index(destination.list_id) else {
        log::warn!("move_card: destination list {} not on board {}", destination.list_id, board.id);
        return false;
    };

    if from_list == to_list {
        return move_item(&mut board.lists[from_list].cards, source.index, destination.index);
    }

    let source_cards = &mut board.lists[from_list].cards;
    if source.index >= source_cards.len() {
        log::warn!(
            "move_card: source index {} out of range (len {})",
            source.index,
            source_cards.len()
        );
        return false;
    }
    let card = source_cards.remove(source.index);

    let target_cards = &mut board.lists[to_list].cards;
    let index = destination.index.min(target_cards.len());
    target_cards.insert(index, card);
    true
}

/// Regroup cards so unchecked cards precede checked ones.
///
/// Within each group cards are ordered by their `order` hint; the sort is
/// stable, so equal hints keep their current relative order.
pub fn sort_by_check_state(cards: &mut [Card]) {
    cards.sort_by_key(|card| (card.checked, card.order));
}

/// Check that no unchecked card follows a checked one.
pub fn is_check_partitioned(cards: &[Card]) -> bool {
    cards.windows(2).all(|pair| !pair[0].checked || pair[1].checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{List, DEFAULT_BACKGROUND_COLOR};

    fn titles(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|card| card.title.as_str()).collect()
    }

    fn board_with(lists: &[(&str, &[&str])]) -> Board {
        let mut board = Board::new("Board", DEFAULT_BACKGROUND_COLOR);
        for (title, cards) in lists {
            let mut list = List::new(*title);
            for (i, card) in cards.iter().enumerate() {
                list.cards.push(Card::new(*card, i as i64));
            }
            board.lists.push(list);
        }
        board
    }

    #[test]
    fn test_move_item_forward_and_back() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);

        assert!(move_item(&mut items, 3, 0));
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn test_move_item_array_move_law() {
        let original: Vec<u32> = (0..6).collect();
        for from in 0..original.len() {
            for to in 0..original.len() {
                if from == to {
                    continue;
                }
                let mut items = original.clone();
                assert!(move_item(&mut items, from, to));
                assert_eq!(items[to], original[from]);

                let rest: Vec<u32> = items.iter().copied().filter(|&x| x != original[from]).collect();
                let expected: Vec<u32> = original.iter().copied().filter(|&x| x != original[from]).collect();
                assert_eq!(rest, expected);
            }
        }
    }

    #[test]
    fn test_move_item_clamps_destination() {
        let mut items = vec![1, 2, 3];
        assert!(move_item(&mut items, 0, 10));
        assert_eq!(items, vec![2, 3, 1]);
    }

    #[test]
    fn test_move_item_rejects_bad_source() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 3, 0));
        assert!(!move_item(&mut items, 1, 1));
        assert_eq!(items, vec![1, 2, 3]);

        let mut empty: Vec<u8> = Vec::new();
        assert!(!move_item(&mut empty, 0, 0));
    }

    #[test]
    fn test_move_card_same_list() {
        let mut board = board_with(&[("Todo", &["A", "B"])]);
        let todo = board.lists[0].id;

        assert!(move_card(&mut board, CardLocation::new(todo, 0), CardLocation::new(todo, 1)));
        assert_eq!(titles(&board.lists[0].cards), vec!["B", "A"]);
    }

    #[test]
    fn test_move_card_across_lists_conserves_cards() {
        let mut board = board_with(&[("Todo", &["A", "B", "C"]), ("Done", &["D"])]);
        let todo = board.lists[0].id;
        let done = board.lists[1].id;
        let moved = board.lists[0].cards[1].clone();

        assert!(move_card(&mut board, CardLocation::new(todo, 1), CardLocation::new(done, 0)));

        assert_eq!(titles(&board.lists[0].cards), vec!["A", "C"]);
        assert_eq!(titles(&board.lists[1].cards), vec!["B", "D"]);
        assert_eq!(board.card_count(), 4);
        assert_eq!(board.lists[1].cards[0], moved);
    }

    #[test]
    fn test_move_card_append_at_length() {
        let mut board = board_with(&[("Todo", &["A"]), ("Done", &["B", "C"])]);
        let todo = board.lists[0].id;
        let done = board.lists[1].id;

        assert!(move_card(&mut board, CardLocation::new(todo, 0), CardLocation::new(done, 2)));
        assert_eq!(titles(&board.lists[1].cards), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_move_card_missing_list_is_noop() {
        let mut board = board_with(&[("Todo", &["A"])]);
        let todo = board.lists[0].id;
        let before = board.clone();

        let missing = crate::model::new_entity_id();
        assert!(!move_card(&mut board, CardLocation::new(todo, 0), CardLocation::new(missing, 0)));
        assert!(!move_card(&mut board, CardLocation::new(todo, 5), CardLocation::new(todo, 0)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_sort_by_check_state() {
        let mut cards = vec![Card::new("A", 0), Card::new("B", 1), Card::new("C", 2)];
        cards[0].checked = true;
        sort_by_check_state(&mut cards);

        assert_eq!(titles(&cards), vec!["B", "C", "A"]);
        assert!(is_check_partitioned(&cards));
    }

    #[test]
    fn test_sort_uses_order_hint_within_group() {
        let mut cards = vec![Card::new("late", 5), Card::new("early", 1)];
        sort_by_check_state(&mut cards);
        assert_eq!(titles(&cards), vec!["early", "late"]);
    }
}
