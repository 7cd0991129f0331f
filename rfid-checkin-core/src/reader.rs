use crate::Uid;

/// Trait for anything that can detect tags being presented to it.
///
/// Implemented by hardware backends (PC/SC readers) and by scripted readers in tests.
pub trait TagReader {
    type Error;

    /// Checks the reader once.
    ///
    /// Returns `Some(uid)` only when a tag has newly arrived. A tag left on the
    /// reader is reported once and then yields `None` until it is removed.
    fn poll(&mut self) -> Result<Option<Uid>, Self::Error>;

    /// Gives the holder feedback (LED, buzzer) after their tap was recorded.
    fn acknowledge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<R: TagReader + ?Sized> TagReader for &mut R {
    type Error = R::Error;

    fn poll(&mut self) -> Result<Option<Uid>, Self::Error> {
        (**self).poll()
    }

    fn acknowledge(&mut self) -> Result<(), Self::Error> {
        (**self).acknowledge()
    }
}
