use bitflags::bitflags;

bitflags! {
    /// Transient per-definition state used by the analysis passes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct DefnFlags: u8 {
        /// On the current recursion-check path (gray).
        const LIVE = 1 << 0;
        /// Recursion check finished for this type (black).
        const CHECKED = 1 << 1;
        /// Size, alignment and field map are final.
        const LAID_OUT = 1 << 2;
    }
}
