/// Holds back content until a surface reports it can accept it.
///
/// Submissions made before the surface is ready are parked; only the latest
/// one is kept, since placement replaces whatever came before.
#[derive(Debug)]
pub struct ReadyGate<T> {
    ready: bool,
    pending: Option<T>,
}

impl<T> Default for ReadyGate<T> {
    fn default() -> Self {
        Self {
            ready: false,
            pending: None,
        }
    }
}

impl<T> ReadyGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns `item` back if it can be applied now, otherwise parks it.
    pub fn submit(&mut self, item: T) -> Option<T> {
        if self.ready {
            return Some(item);
        }
        self.pending = Some(item);
        None
    }

    /// Marks the surface ready and hands back the parked submission, if any.
    pub fn open(&mut self) -> Option<T> {
        self.ready = true;
        self.pending.take()
    }

    /// Back to the not-ready state, dropping anything parked.
    pub fn close(&mut self) {
        self.ready = false;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::ReadyGate;

    #[test]
    fn parks_until_open_and_keeps_latest() {
        let mut gate = ReadyGate::new();
        assert_eq!(gate.submit(1), None);
        assert_eq!(gate.submit(2), None);
        assert_eq!(gate.open(), Some(2));
        assert_eq!(gate.submit(3), Some(3));
    }

    #[test]
    fn passes_through_once_open() {
        let mut gate = ReadyGate::new();
        assert_eq!(gate.open(), None);
        assert_eq!(gate.submit(7), Some(7));
    }

    #[test]
    fn close_drops_pending() {
        let mut gate = ReadyGate::new();
        gate.submit("a");
        gate.close();
        assert!(!gate.is_ready());
        assert_eq!(gate.open(), None);
    }
}
