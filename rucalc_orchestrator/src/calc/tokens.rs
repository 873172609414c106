//! Token sequence of an expression under reduction.
//!
//! Tokens live in an arena and are linked through slot indices, so a [Handle] stays valid
//! while other tokens are inserted or removed around it. A handle carries the generation of
//! its slot: once the token is removed, the handle no longer resolves even if the slot is reused.

use ::rucalc_common::task::{Operator, TaskId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Operator(Operator),
    /// Stands for an operation being computed remotely.
    Task(TaskId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Handle {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    token: Option<Token>,
    generation: u32,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct TokenList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl TokenList {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn handle(&self, index: usize) -> Handle {
        Handle {
            index,
            generation: self.slots[index].generation,
        }
    }

    /// Index of the slot behind `handle` if the token is still alive.
    fn live(&self, handle: Handle) -> Option<usize> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation && slot.token.is_some())
            .map(|_| handle.index)
    }

    fn allocate(&mut self, token: Token, prev: Option<usize>, next: Option<usize>) -> usize {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.token = Some(token);
                slot.prev = prev;
                slot.next = next;
                index
            }
            None => {
                self.slots.push(Slot {
                    token: Some(token),
                    generation: 0,
                    prev,
                    next,
                });
                self.slots.len() - 1
            }
        }
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.head.map(|index| self.handle(index))
    }

    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        let index = self.live(handle)?;
        self.slots[index].next.map(|next| self.handle(next))
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<Token> {
        self.live(handle).and_then(|index| self.slots[index].token)
    }

    pub(crate) fn push_back(&mut self, token: Token) -> Handle {
        let index = self.allocate(token, self.tail, None);
        match self.tail {
            Some(tail) => self.slots[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        self.handle(index)
    }

    /// Insert `token` right before `at`. Returns `None` if `at` is stale.
    pub(crate) fn insert_before(&mut self, token: Token, at: Handle) -> Option<Handle> {
        let at = self.live(at)?;
        let prev = self.slots[at].prev;
        let index = self.allocate(token, prev, Some(at));
        self.slots[at].prev = Some(index);
        match prev {
            Some(prev) => self.slots[prev].next = Some(index),
            None => self.head = Some(index),
        }
        self.len += 1;
        Some(self.handle(index))
    }

    /// Unlink the token behind `handle`. Returns `None` if `handle` is stale.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<Token> {
        let index = self.live(handle)?;
        let slot = &mut self.slots[index];
        let token = slot.token.take();
        let (prev, next) = (slot.prev.take(), slot.next.take());
        slot.generation = slot.generation.wrapping_add(1);
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }
        self.free.push(index);
        self.len -= 1;
        token
    }

    /// Swap the token behind `handle` for a new one, keeping its position.
    pub(crate) fn replace(&mut self, handle: Handle, token: Token) -> Option<Handle> {
        let replacement = self.insert_before(token, handle)?;
        self.remove(handle);
        Some(replacement)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Token> + '_ {
        ::std::iter::successors(self.head, |&index| self.slots[index].next)
            .filter_map(|index| self.slots[index].token)
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut list = Self::default();
        for token in iter {
            list.push_back(token);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(list: &TokenList) -> Vec<f64> {
        list.iter()
            .map(|token| match token {
                Token::Number(value) => value,
                other => panic!("unexpected token {:?}", other),
            })
            .collect()
    }

    #[test]
    fn push_and_iterate() {
        let list: TokenList = [1.0, 2.0, 3.0].into_iter().map(Token::Number).collect();
        assert_eq!(list.len(), 3);
        assert_eq!(numbers(&list), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn insert_before_head_and_middle() {
        let mut list = TokenList::default();
        let two = list.push_back(Token::Number(2.0));
        let four = list.push_back(Token::Number(4.0));
        list.insert_before(Token::Number(1.0), two).unwrap();
        list.insert_before(Token::Number(3.0), four).unwrap();
        assert_eq!(numbers(&list), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(list.get(list.first().unwrap()), Some(Token::Number(1.0)));
    }

    #[test]
    fn remove_keeps_other_handles_valid() {
        let mut list = TokenList::default();
        let a = list.push_back(Token::Number(1.0));
        let b = list.push_back(Token::Number(2.0));
        let c = list.push_back(Token::Number(3.0));
        assert_eq!(list.remove(b), Some(Token::Number(2.0)));
        assert_eq!(list.next(a), Some(c));
        assert_eq!(list.remove(c), Some(Token::Number(3.0)));
        assert_eq!(list.next(a), None);
        assert_eq!(numbers(&list), vec![1.0]);
        list.remove(a);
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
    }

    #[test]
    fn stale_handle_does_not_resolve_after_slot_reuse() {
        let mut list = TokenList::default();
        let old = list.push_back(Token::Task(1));
        list.remove(old);
        let new = list.push_back(Token::Task(2));
        assert_ne!(old, new);
        assert_eq!(list.get(old), None);
        assert_eq!(list.remove(old), None);
        assert_eq!(list.get(new), Some(Token::Task(2)));
    }

    #[test]
    fn replace_in_place() {
        let mut list = TokenList::default();
        list.push_back(Token::Number(1.0));
        let placeholder = list.push_back(Token::Task(9));
        list.push_back(Token::Operator(Operator::Add));
        let number = list.replace(placeholder, Token::Number(2.0)).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(number), Some(Token::Number(2.0)));
        assert_eq!(list.get(placeholder), None);
        assert_eq!(
            list.iter().collect::<Vec<_>>(),
            vec![
                Token::Number(1.0),
                Token::Number(2.0),
                Token::Operator(Operator::Add)
            ]
        );
    }
}
