//! In-app virtual windows
//!
//! A virtual window is a title bar, a close button and one embedded content
//! surface, drawn inside the main window. Open windows form a stack; the
//! global close shortcut pops the most recent one.

use crate::pages::LOADING_TITLE;
use sitewrap_core::types::SurfaceId;
use sitewrap_core::{SiteWrapError, SiteWrapResult};

/// One open virtual window. `H` is the host's handle for its views.
#[derive(Debug)]
pub struct VirtualWindow<H> {
    pub surface: SurfaceId,
    pub url: String,
    pub title: String,
    pub handle: H,
}

/// Where a title change from a surface should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleTarget {
    /// Title bar of the virtual window owning the surface
    VirtualWindow(SurfaceId),
    /// Native window title
    Native,
}

/// Open virtual windows, oldest first
#[derive(Debug)]
pub struct VirtualWindowStack<H> {
    windows: Vec<VirtualWindow<H>>,
}

impl<H> VirtualWindowStack<H> {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
        }
    }

    /// Push a new virtual window. Each surface can back only one window.
    pub fn open(&mut self, surface: SurfaceId, url: impl Into<String>, handle: H) -> SiteWrapResult<()> {
        if self.contains(surface) {
            return Err(SiteWrapError::window(format!(
                "{} already backs a virtual window",
                surface
            )));
        }

        let url = url.into();
        log::info!("Opened virtual window {} for {}", surface, url);
        self.windows.push(VirtualWindow {
            surface,
            url,
            title: LOADING_TITLE.to_string(),
            handle,
        });
        Ok(())
    }

    /// Close the window backed by `surface` (its own close button)
    pub fn close(&mut self, surface: SurfaceId) -> Option<VirtualWindow<H>> {
        let index = self.windows.iter().position(|w| w.surface == surface)?;
        let window = self.windows.remove(index);
        log::info!("Closed virtual window {}", surface);
        Some(window)
    }

    /// Close the most recently opened window. No-op when none is open.
    pub fn close_most_recent(&mut self) -> Option<VirtualWindow<H>> {
        let window = self.windows.pop()?;
        log::info!("Closed most recent virtual window {}", window.surface);
        Some(window)
    }

    /// Record a title reported by `surface` and say where to show it
    pub fn update_title(&mut self, surface: SurfaceId, title: &str) -> TitleTarget {
        match self.windows.iter_mut().find(|w| w.surface == surface) {
            Some(window) => {
                window.title = title.to_string();
                TitleTarget::VirtualWindow(surface)
            }
            None => TitleTarget::Native,
        }
    }

    pub fn get(&self, surface: SurfaceId) -> Option<&VirtualWindow<H>> {
        self.windows.iter().find(|w| w.surface == surface)
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.get(surface).is_some()
    }

    pub fn most_recent(&self) -> Option<&VirtualWindow<H>> {
        self.windows.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VirtualWindow<H>> {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl<H> Default for VirtualWindowStack<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_most_recent_is_lifo() {
        let mut stack = VirtualWindowStack::new();
        let a = SurfaceId::new();
        let b = SurfaceId::new();
        stack.open(a, "https://a.example.com", "A").unwrap();
        stack.open(b, "https://b.example.com", "B").unwrap();

        let closed = stack.close_most_recent().unwrap();
        assert_eq!(closed.surface, b);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.most_recent().map(|w| w.surface), Some(a));
    }

    #[test]
    fn test_close_on_empty_stack_is_noop() {
        let mut stack: VirtualWindowStack<()> = VirtualWindowStack::new();
        assert!(stack.close_most_recent().is_none());
        assert!(stack.close(SurfaceId::new()).is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_close_button_removes_only_its_window() {
        let mut stack = VirtualWindowStack::new();
        let a = SurfaceId::new();
        let b = SurfaceId::new();
        let c = SurfaceId::new();
        stack.open(a, "https://a.example.com", 1).unwrap();
        stack.open(b, "https://b.example.com", 2).unwrap();
        stack.open(c, "https://c.example.com", 3).unwrap();

        assert_eq!(stack.close(b).map(|w| w.handle), Some(2));
        let order: Vec<_> = stack.iter().map(|w| w.handle).collect();
        assert_eq!(order, vec![1, 3]);
        assert!(stack.close(b).is_none());
    }

    #[test]
    fn test_surface_backs_one_window() {
        let mut stack = VirtualWindowStack::new();
        let a = SurfaceId::new();
        stack.open(a, "https://a.example.com", ()).unwrap();
        assert!(stack.open(a, "https://b.example.com", ()).is_err());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_title_routing() {
        let mut stack = VirtualWindowStack::new();
        let inner = SurfaceId::new();
        let main = SurfaceId::new();
        stack.open(inner, "https://a.example.com", ()).unwrap();
        assert_eq!(stack.get(inner).unwrap().title, LOADING_TITLE);

        assert_eq!(stack.update_title(inner, "Docs"), TitleTarget::VirtualWindow(inner));
        assert_eq!(stack.get(inner).unwrap().title, "Docs");
        assert_eq!(stack.update_title(main, "Home"), TitleTarget::Native);
    }
}
