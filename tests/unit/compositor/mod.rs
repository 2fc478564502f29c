use super::*;
use crate::compositor::backend::{TestBackend, TestFrameHandle};
use crate::session::guard::ScreenOps;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingScreenOps {
    enters: AtomicUsize,
    leaves: AtomicUsize,
}

impl ScreenOps for CountingScreenOps {
    fn enter(&self) -> io::Result<()> {
        self.enters.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn test_compositor(rows: u16, cols: u16) -> (Compositor, TestFrameHandle) {
    let screen = ScreenGuard::with_ops(Arc::new(CountingScreenOps::default())).unwrap();
    let backend = TestBackend::new(rows, cols);
    let handle = backend.handle();
    let compositor = Compositor::with_parts(screen, Box::new(backend)).unwrap();
    (compositor, handle)
}

/// Every mutation must leave the order vector covering exactly the live
/// layers, with each stored rank equal to its 1-based position.
fn assert_order_invariants(compositor: &Compositor) {
    let order = compositor.paint_order();
    assert_eq!(order.len(), compositor.layer_count());
    for (idx, &id) in order.iter().enumerate() {
        let layer = compositor.layer(id).expect("ordered id must be live");
        assert_eq!(layer.rank(), idx + 1);
    }
}

#[test]
fn create_assigns_sequential_ranks() {
    let (mut compositor, _) = test_compositor(10, 20);
    let a = compositor.create_layer(2, 2, 0, 0);
    let b = compositor.create_layer(2, 2, 1, 1);
    let c = compositor.create_layer(2, 2, 2, 2);

    assert_eq!(compositor.layer(a).unwrap().rank(), 1);
    assert_eq!(compositor.layer(b).unwrap().rank(), 2);
    assert_eq!(compositor.layer(c).unwrap().rank(), 3);
    assert_order_invariants(&compositor);
}

#[test]
fn sub_layer_wires_parent_and_child() {
    let (mut compositor, _) = test_compositor(10, 20);
    let parent = compositor.create_layer(8, 18, 0, 0);
    let sub = compositor.create_sub_layer(parent, 4, 8, 1, 1).unwrap();

    assert_eq!(compositor.layer(parent).unwrap().child, Some(sub));
    assert_eq!(compositor.layer(sub).unwrap().parent, Some(parent));
    assert_order_invariants(&compositor);
}

#[test]
fn sub_layer_on_a_child_is_rejected() {
    let (mut compositor, _) = test_compositor(10, 20);
    let parent = compositor.create_layer(8, 18, 0, 0);
    let sub = compositor.create_sub_layer(parent, 4, 8, 1, 1).unwrap();

    let order_before: Vec<_> = compositor.paint_order().to_vec();
    assert!(matches!(
        compositor.create_sub_layer(sub, 2, 2, 0, 0),
        Err(CompositorError::NestedSubLayer)
    ));
    assert_eq!(compositor.layer_count(), 2);
    assert_eq!(compositor.paint_order(), order_before.as_slice());
    assert_order_invariants(&compositor);
}

#[test]
fn second_sub_layer_on_same_parent_is_rejected() {
    let (mut compositor, _) = test_compositor(10, 20);
    let parent = compositor.create_layer(8, 18, 0, 0);
    compositor.create_sub_layer(parent, 4, 8, 1, 1).unwrap();

    assert!(matches!(
        compositor.create_sub_layer(parent, 2, 2, 0, 0),
        Err(CompositorError::NestedSubLayer)
    ));
    assert_eq!(compositor.layer_count(), 2);
    assert_order_invariants(&compositor);
}

#[test]
fn destroy_cascades_to_the_child_first() {
    let (mut compositor, _) = test_compositor(10, 20);
    let base = compositor.create_layer(10, 20, 0, 0);
    let parent = compositor.create_layer(8, 18, 0, 0);
    let sub = compositor.create_sub_layer(parent, 4, 8, 1, 1).unwrap();

    compositor.destroy_layer(parent).unwrap();

    assert_eq!(compositor.layer_count(), 1);
    assert!(compositor.layer(parent).is_none());
    assert!(compositor.layer(sub).is_none());
    assert!(compositor.layer(base).is_some());
    assert_order_invariants(&compositor);
}

#[test]
fn destroying_a_child_detaches_it_from_the_parent() {
    let (mut compositor, _) = test_compositor(10, 20);
    let parent = compositor.create_layer(8, 18, 0, 0);
    let sub = compositor.create_sub_layer(parent, 4, 8, 1, 1).unwrap();

    compositor.destroy_layer(sub).unwrap();

    assert_eq!(compositor.layer(parent).unwrap().child, None);
    assert_order_invariants(&compositor);

    // The parent is free to take a new child again.
    assert!(compositor.create_sub_layer(parent, 2, 2, 0, 0).is_ok());
}

#[test]
fn the_last_surface_cannot_be_destroyed() {
    let (mut compositor, _) = test_compositor(10, 20);
    let only = compositor.create_layer(10, 20, 0, 0);
    assert!(matches!(
        compositor.destroy_layer(only),
        Err(CompositorError::LastLayer)
    ));
    assert_eq!(compositor.layer_count(), 1);

    // A parent/child pair that covers the whole display counts too.
    let sub = compositor.create_sub_layer(only, 4, 8, 1, 1).unwrap();
    assert!(matches!(
        compositor.destroy_layer(only),
        Err(CompositorError::LastLayer)
    ));
    assert!(compositor.layer(sub).is_some());
    assert_order_invariants(&compositor);
}

#[test]
fn destroyed_ids_stay_invalid() {
    let (mut compositor, _) = test_compositor(10, 20);
    let _keep = compositor.create_layer(2, 2, 0, 0);
    let gone = compositor.create_layer(2, 2, 1, 1);
    compositor.destroy_layer(gone).unwrap();

    assert!(compositor.layer(gone).is_none());
    // A fresh allocation must not resurrect the stale id.
    let _new = compositor.create_layer(2, 2, 2, 2);
    assert!(compositor.layer(gone).is_none());
    assert!(matches!(
        compositor.destroy_layer(gone),
        Err(CompositorError::UnknownLayer)
    ));
}

#[test]
fn reorder_clamps_out_of_range_ranks() {
    let (mut compositor, _) = test_compositor(10, 20);
    let a = compositor.create_layer(2, 2, 0, 0);
    let b = compositor.create_layer(2, 2, 1, 1);
    let c = compositor.create_layer(2, 2, 2, 2);

    compositor.reorder(a, 99).unwrap();
    assert_eq!(compositor.paint_order(), &[b, c, a]);
    assert_order_invariants(&compositor);

    compositor.reorder(a, 0).unwrap();
    assert_eq!(compositor.paint_order(), &[a, b, c]);
    assert_order_invariants(&compositor);
}

#[test]
fn reorder_to_current_rank_is_a_noop() {
    let (mut compositor, _) = test_compositor(10, 20);
    let a = compositor.create_layer(2, 2, 0, 0);
    let b = compositor.create_layer(2, 2, 1, 1);

    let before: Vec<_> = compositor.paint_order().to_vec();
    compositor.reorder(b, 2).unwrap();
    assert_eq!(compositor.paint_order(), before.as_slice());

    compositor.reorder(a, 1).unwrap();
    assert_eq!(compositor.paint_order(), before.as_slice());
}

#[test]
fn refresh_paints_in_ascending_rank() {
    let (mut compositor, handle) = test_compositor(3, 6);
    let under = compositor.create_layer(1, 6, 0, 0);
    let over = compositor.create_layer(1, 2, 0, 0);

    compositor
        .layer_mut(under)
        .unwrap()
        .put_str(0, 0, "AAAAAA");
    compositor.layer_mut(over).unwrap().put_str(0, 0, "BB");

    compositor.refresh().unwrap();
    assert_eq!(handle.row(0), "BBAAAA");

    // Swapping the order swaps who occludes whom.
    compositor.reorder(over, 1).unwrap();
    compositor.refresh().unwrap();
    assert_eq!(handle.row(0), "AAAAAA");
}

#[test]
fn sub_layer_paints_relative_to_its_parent() {
    let (mut compositor, handle) = test_compositor(5, 10);
    let parent = compositor.create_layer(4, 8, 1, 1);
    let sub = compositor.create_sub_layer(parent, 1, 2, 1, 1).unwrap();
    compositor.layer_mut(sub).unwrap().put_str(0, 0, "xy");

    compositor.refresh().unwrap();
    assert_eq!(&handle.row(2)[2..4], "xy");
}

#[test]
fn refresh_is_a_noop_while_stopped() {
    let (mut compositor, handle) = test_compositor(3, 6);
    compositor.create_layer(1, 6, 0, 0);

    compositor.refresh().unwrap();
    assert_eq!(handle.frames_presented(), 1);

    compositor.stop().unwrap();
    compositor.refresh().unwrap();
    assert_eq!(handle.frames_presented(), 1);

    compositor.start().unwrap();
    compositor.refresh().unwrap();
    assert_eq!(handle.frames_presented(), 2);
}

#[test]
fn stop_is_idempotent() {
    let ops = Arc::new(CountingScreenOps::default());
    let screen = ScreenGuard::with_ops(Arc::clone(&ops) as Arc<dyn ScreenOps>).unwrap();
    let mut compositor =
        Compositor::with_parts(screen, Box::new(TestBackend::new(3, 6))).unwrap();

    compositor.stop().unwrap();
    compositor.stop().unwrap();
    assert_eq!(ops.leaves.load(Ordering::SeqCst), 1);

    compositor.start().unwrap();
    compositor.start().unwrap();
    assert_eq!(ops.enters.load(Ordering::SeqCst), 2);
}
