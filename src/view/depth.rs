//! Nesting depth and activity of a view slot.

/// What the view knows about one ancestor in the component tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ancestor {
    /// The router root. The walk stops here.
    pub router_root: bool,

    /// The ancestor is itself rendered by a view slot.
    pub router_view: bool,

    /// The ancestor preserves its subtree when deactivated.
    pub keep_alive: bool,

    /// The ancestor is currently deactivated.
    pub inactive: bool,
}

impl Ancestor {
    /// Plain component, neither a view nor kept alive.
    pub fn plain() -> Self {
        Self::default()
    }

    /// The router root.
    pub fn root() -> Self {
        Self {
            router_root: true,
            ..Self::default()
        }
    }

    /// A component rendered by a view slot.
    pub fn view() -> Self {
        Self {
            router_view: true,
            ..Self::default()
        }
    }

    /// Marks the ancestor as kept alive, active or not.
    pub fn kept_alive(mut self, inactive: bool) -> Self {
        self.keep_alive = true;
        self.inactive = inactive;
        self
    }
}

/// Where a view slot sits in the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    /// Index into the route's matched segments.
    pub depth: usize,

    /// Some kept-alive ancestor is deactivated.
    pub inactive: bool,
}

/// Walks ancestors, nearest first, up to the router root.
pub fn resolve_placement<'a, I>(ancestors: I) -> Placement
where
    I: IntoIterator<Item = &'a Ancestor>,
{
    let mut placement = Placement::default();
    for ancestor in ancestors {
        if ancestor.router_root {
            break;
        }
        if ancestor.router_view {
            placement.depth += 1;
        }
        if ancestor.keep_alive && ancestor.inactive {
            placement.inactive = true;
        }
    }
    placement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_view() {
        let placement = resolve_placement(&[Ancestor::plain(), Ancestor::root()]);
        assert_eq!(placement, Placement { depth: 0, inactive: false });
    }

    #[test]
    fn test_counts_view_ancestors() {
        let chain = [
            Ancestor::plain(),
            Ancestor::view(),
            Ancestor::plain(),
            Ancestor::view(),
            Ancestor::root(),
        ];
        assert_eq!(resolve_placement(&chain).depth, 2);
    }

    #[test]
    fn test_stops_at_root() {
        let chain = [Ancestor::view(), Ancestor::root(), Ancestor::view(), Ancestor::view()];
        assert_eq!(resolve_placement(&chain).depth, 1);
    }

    #[test]
    fn test_inactive_kept_alive_ancestor() {
        let chain = [Ancestor::view().kept_alive(true), Ancestor::root()];
        assert_eq!(resolve_placement(&chain), Placement { depth: 1, inactive: true });

        let chain = [Ancestor::view().kept_alive(false), Ancestor::root()];
        assert!(!resolve_placement(&chain).inactive);

        // Deactivated without keep-alive is being torn down, not preserved
        let chain = [Ancestor { inactive: true, ..Ancestor::plain() }];
        assert!(!resolve_placement(&chain).inactive);
    }

    #[test]
    fn test_empty_chain() {
        let chain: [Ancestor; 0] = [];
        assert_eq!(resolve_placement(&chain), Placement::default());
    }
}
