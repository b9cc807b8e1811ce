/// Identifies one in-flight request issued by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// Generation counter that lets a component discard late responses.
///
/// Issuing a ticket or invalidating bumps the generation, so any older
/// ticket no longer matches.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: u64,
    outstanding: bool,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.current += 1;
        self.outstanding = true;
        RequestTicket(self.current)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.outstanding && ticket.0 == self.current
    }

    /// Accepts the response for `ticket` at most once.
    pub fn settle(&mut self, ticket: RequestTicket) -> bool {
        if self.is_current(ticket) {
            self.outstanding = false;
            true
        } else {
            false
        }
    }

    /// Drops every outstanding ticket, e.g. when the owner is torn down.
    pub fn invalidate(&mut self) {
        self.current += 1;
        self.outstanding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut generation = RequestGeneration::new();
        let first = generation.issue();
        let second = generation.issue();
        assert!(!generation.settle(first));
        assert!(generation.settle(second));
    }

    #[test]
    fn ticket_settles_once() {
        let mut generation = RequestGeneration::new();
        let ticket = generation.issue();
        assert!(generation.settle(ticket));
        assert!(!generation.settle(ticket));
        assert!(!generation.is_current(ticket));
    }

    #[test]
    fn invalidate_discards_in_flight_ticket() {
        let mut generation = RequestGeneration::new();
        let ticket = generation.issue();
        generation.invalidate();
        assert!(!generation.is_current(ticket));
        assert!(!generation.settle(ticket));
    }
}
