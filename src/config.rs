use std::borrow::Cow;
use std::fmt;

use crate::atom::APPLE_ITUNES_MEAN;
use crate::{GenreIndex, StandardGenres};

/// Configure how metadata is written.
#[derive(Clone)]
pub struct WriteConfig<'a> {
    /// Emit a metadata handler (`hdlr`) atom when a metadata (`meta`) atom is created. Existing
    /// metadata atoms are left as they are.
    pub handler: bool,
    /// The mean string of freeform (`----`) atoms.
    pub freeform_mean: Cow<'a, str>,
    /// The vocabulary used to decide between standard (`gnre`) and custom (`©gen`) genres.
    pub genres: &'a dyn GenreIndex,
}

impl WriteConfig<'_> {
    /// The default configuration: no handler atom, `com.apple.iTunes` freeform mean and the
    /// ID3v1 genre vocabulary.
    pub const DEFAULT: WriteConfig<'static> = WriteConfig {
        handler: false,
        freeform_mean: Cow::Borrowed(APPLE_ITUNES_MEAN),
        genres: &StandardGenres,
    };
}

impl Default for WriteConfig<'_> {
    fn default() -> Self {
        WriteConfig::DEFAULT
    }
}

impl fmt::Debug for WriteConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteConfig")
            .field("handler", &self.handler)
            .field("freeform_mean", &self.freeform_mean)
            .finish_non_exhaustive()
    }
}
