use crate::error::{Result, XsvError};

/// Splits one forward-only sequence into a directly consumed prefix and
/// "the rest".
///
/// Items taken with [`next_item`](Subsequencer::next_item) are consumed right
/// away; [`rest`](Subsequencer::rest) returns a view over whatever remains.
/// Both access patterns share the same underlying iterator, so nothing is read
/// twice and nothing is buffered.
///
/// ```
/// use xsvlib::core::subsequencer::Subsequencer;
///
/// let mut seq = Subsequencer::new(vec!["header", "a", "b"].into_iter());
/// assert_eq!(seq.next_item().unwrap(), "header");
/// let body: Vec<_> = seq.rest().collect();
/// assert_eq!(body, vec!["a", "b"]);
/// assert!(seq.is_exhausted());
/// ```
pub struct Subsequencer<I: Iterator> {
    host: I,
    pristine: Option<I>,
    exhausted: bool,
    break_requested: bool,
}

impl<I: Iterator> Subsequencer<I> {
    /// Wraps a sequence that cannot be restarted.
    pub fn new(host: I) -> Self {
        Self {
            host,
            pristine: None,
            exhausted: false,
            break_requested: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Takes the next item, failing with [`XsvError::Exhausted`] when there is none.
    pub fn next_item(&mut self) -> Result<I::Item> {
        self.next_or_none().ok_or(XsvError::Exhausted)
    }

    pub fn next_or_none(&mut self) -> Option<I::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.host.next();
        if item.is_none() {
            self.exhausted = true;
        }
        item
    }

    /// A view over the remaining items. It ends when the host is exhausted or
    /// a break was requested.
    pub fn rest(&mut self) -> Rest<'_, I> {
        Rest { owner: self }
    }

    /// Makes the current (or next) [`rest`](Subsequencer::rest) view end
    /// before its next item. The request is cleared once a view honours it.
    pub fn request_break(&mut self) {
        self.break_requested = true;
    }

    pub fn into_inner(self) -> I {
        self.host
    }
}

impl<I: Iterator + Clone> Subsequencer<I> {
    /// Wraps a sequence that can be restarted with [`reset`](Subsequencer::reset).
    pub fn restartable(host: I) -> Self {
        Self {
            pristine: Some(host.clone()),
            host,
            exhausted: false,
            break_requested: false,
        }
    }

    /// Rewinds to the start of the original sequence.
    pub fn reset(&mut self) -> Result<()> {
        match &self.pristine {
            Some(pristine) => {
                self.host = pristine.clone();
                self.exhausted = false;
                self.break_requested = false;
                Ok(())
            }
            None => Err(XsvError::Usage(
                "the underlying sequence does not support restart".to_string(),
            )),
        }
    }
}

/// The "rest of the sequence" view returned by [`Subsequencer::rest`].
pub struct Rest<'a, I: Iterator> {
    owner: &'a mut Subsequencer<I>,
}

impl<I: Iterator> Rest<'_, I> {
    pub fn request_break(&mut self) {
        self.owner.request_break();
    }
}

impl<I: Iterator> Iterator for Rest<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.owner.break_requested {
            self.owner.break_requested = false;
            return None;
        }
        self.owner.next_or_none()
    }
}
