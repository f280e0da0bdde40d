#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::inventory::test_helpers::vehicle_with_images;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn assert_reset(lb: &Lightbox<'_>) {
    assert_eq!(lb.zoom(), DEFAULT_ZOOM);
    assert_eq!(lb.pan(), Point::ORIGIN);
}

// --- initial state ---

#[test]
fn starts_inline_idle_at_origin() {
    let lb = Lightbox::new(GalleryContext::Carousel);
    assert!(!lb.is_open());
    assert!(!lb.is_fullscreen());
    assert!(!lb.is_dragging());
    assert_eq!(lb.index(), 0);
    assert_reset(&lb);
    assert_eq!(lb.context(), GalleryContext::Carousel);
    assert!(lb.current_image().is_none());
}

#[test]
fn open_gallery_selects_first_image() {
    let car = vehicle_with_images("v1", 3);
    let other = vehicle_with_images("v2", 2);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.next_image();
    lb.zoom_in();

    lb.open_gallery(&other);
    assert!(lb.is_open());
    assert_eq!(lb.index(), 0);
    assert_reset(&lb);
    assert_eq!(lb.current_image(), other.images.first());
    assert_eq!(lb.vehicle().map(|v| v.id.as_str()), Some("v2"));
}

// --- navigation ---

#[test]
fn next_wraps_around_after_n_steps() {
    for n in 1..=6 {
        let car = vehicle_with_images("v", n);
        let mut lb = Lightbox::default();
        lb.open_gallery(&car);
        lb.next_image();
        let start = lb.index();
        for _ in 0..n {
            lb.next_image();
        }
        assert_eq!(lb.index(), start, "n = {n}");
    }
}

#[test]
fn prev_from_first_goes_to_last() {
    let car = vehicle_with_images("v", 4);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.prev_image();
    assert_eq!(lb.index(), 3);
    lb.next_image();
    assert_eq!(lb.index(), 0);
}

#[test]
fn navigation_without_images_is_a_no_op() {
    let car = vehicle_with_images("v", 0);
    let mut lb = Lightbox::default();
    lb.next_image();
    lb.prev_image();
    lb.open_gallery(&car);
    lb.next_image();
    lb.prev_image();
    assert_eq!(lb.index(), 0);
    assert!(lb.current_image().is_none());
}

#[test]
fn navigation_resets_zoom_and_pan_even_mid_drag() {
    let car = vehicle_with_images("v", 3);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.zoom_in();
    lb.zoom_in();
    lb.begin_drag(Point::new(10.0, 10.0));
    lb.drag_to(Point::new(40.0, -5.0));
    assert!(lb.is_dragging());
    assert_ne!(lb.pan(), Point::ORIGIN);

    lb.next_image();
    assert_reset(&lb);
    assert!(!lb.is_dragging());

    lb.zoom_out();
    lb.prev_image();
    assert_reset(&lb);
}

// --- zoom ---

#[test]
fn zoom_in_saturates_at_max() {
    let mut lb = Lightbox::default();
    for _ in 0..50 {
        lb.zoom_in();
        assert!(lb.zoom() <= MAX_ZOOM);
    }
    assert_eq!(lb.zoom(), MAX_ZOOM);
}

#[test]
fn zoom_out_saturates_at_min() {
    let mut lb = Lightbox::default();
    for _ in 0..50 {
        lb.zoom_out();
        assert!(lb.zoom() >= MIN_ZOOM);
    }
    assert_eq!(lb.zoom(), MIN_ZOOM);
}

#[test]
fn zoom_steps_by_factor() {
    let mut lb = Lightbox::default();
    lb.zoom_in();
    assert!(approx_eq(lb.zoom(), 1.2));
    lb.zoom_in();
    assert!(approx_eq(lb.zoom(), 1.44));
    lb.zoom_out();
    assert!(approx_eq(lb.zoom(), 1.2));
}

#[test]
fn reset_zoom_and_pan() {
    let car = vehicle_with_images("v", 1);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.zoom_in();
    lb.begin_drag(Point::new(0.0, 0.0));
    lb.drag_to(Point::new(5.0, 5.0));
    lb.reset_zoom_and_pan();
    assert_reset(&lb);
}

// --- drag ---

#[test]
fn drag_pans_by_pointer_delta_when_zoomed() {
    let car = vehicle_with_images("v", 1);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.zoom_in();
    lb.begin_drag(Point::new(100.0, 100.0));
    lb.drag_to(Point::new(110.0, 95.0));
    lb.drag_to(Point::new(130.0, 90.0));
    assert!(approx_eq(lb.pan().x, 30.0));
    assert!(approx_eq(lb.pan().y, -10.0));
    lb.end_drag();
    assert!(!lb.is_dragging());
    lb.drag_to(Point::new(500.0, 500.0));
    assert!(approx_eq(lb.pan().x, 30.0));
}

#[test]
fn drag_without_begin_has_no_effect() {
    let mut lb = Lightbox::default();
    lb.zoom_in();
    lb.drag_to(Point::new(50.0, 50.0));
    assert_eq!(lb.pan(), Point::ORIGIN);
}

#[test]
fn begin_drag_ignored_at_default_zoom() {
    let mut lb = Lightbox::default();
    lb.begin_drag(Point::new(1.0, 1.0));
    assert!(!lb.is_dragging());
    lb.zoom_in();
    lb.drag_to(Point::new(9.0, 9.0));
    assert_eq!(lb.pan(), Point::ORIGIN);
}

#[test]
fn drag_stops_panning_once_zoomed_back_out() {
    let mut lb = Lightbox::default();
    lb.zoom_in();
    lb.begin_drag(Point::new(0.0, 0.0));
    lb.zoom_out();
    lb.drag_to(Point::new(20.0, 20.0));
    assert_eq!(lb.pan(), Point::ORIGIN);
}

#[test]
fn end_drag_is_unconditional() {
    let mut lb = Lightbox::default();
    lb.end_drag();
    assert!(!lb.is_dragging());
}

// --- fullscreen + keyboard ---

#[test]
fn fullscreen_transitions_reset_and_toggle_listener() {
    let car = vehicle_with_images("v", 2);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.zoom_in();
    lb.enter_fullscreen();
    assert!(lb.is_fullscreen());
    assert!(lb.is_listening_for_keys());
    assert_reset(&lb);

    lb.zoom_in();
    lb.exit_fullscreen();
    assert!(!lb.is_fullscreen());
    assert!(!lb.is_listening_for_keys());
    assert_reset(&lb);
}

#[test]
fn keys_are_ignored_when_not_fullscreen() {
    let car = vehicle_with_images("v", 3);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    for name in ["ArrowRight", "ArrowLeft", "+", "=", "-", "0", "Escape"] {
        assert!(!lb.handle_key(&Key::from_name(name)), "{name}");
    }
    assert_eq!(lb.index(), 0);
    assert_reset(&lb);
}

#[test]
fn fullscreen_key_bindings() {
    let car = vehicle_with_images("v", 3);
    let mut lb = Lightbox::default();
    lb.open_gallery(&car);
    lb.enter_fullscreen();

    assert!(lb.handle_key(&Key::ArrowRight));
    assert_eq!(lb.index(), 1);
    assert!(lb.handle_key(&Key::ArrowLeft));
    assert!(lb.handle_key(&Key::ArrowLeft));
    assert_eq!(lb.index(), 2);

    assert!(lb.handle_key(&Key::Char('+')));
    assert!(approx_eq(lb.zoom(), 1.2));
    assert!(lb.handle_key(&Key::Char('=')));
    assert!(approx_eq(lb.zoom(), 1.44));
    assert!(lb.handle_key(&Key::Char('-')));
    assert!(approx_eq(lb.zoom(), 1.2));
    assert!(lb.handle_key(&Key::Char('0')));
    assert_reset(&lb);

    assert!(!lb.handle_key(&Key::Char('x')));
    assert!(!lb.handle_key(&Key::Other("Tab".into())));

    assert!(lb.handle_key(&Key::Escape));
    assert!(!lb.is_fullscreen());
    assert!(!lb.handle_key(&Key::ArrowRight));
    assert_eq!(lb.index(), 2);
}

#[test]
fn closing_gallery_detaches_key_listener() {
    let car = vehicle_with_images("v", 2);
    let mut lb = Lightbox::new(GalleryContext::Dashboard);
    lb.open_gallery(&car);
    lb.enter_fullscreen();
    lb.close_gallery();
    assert!(!lb.is_open());
    assert!(!lb.is_fullscreen());
    assert!(!lb.is_listening_for_keys());
    assert!(lb.vehicle().is_none());
    assert!(!lb.handle_key(&Key::ArrowRight));
}

// --- observers ---

#[test]
fn subscribers_receive_views_until_unsubscribed() {
    let car = vehicle_with_images("v", 2);
    let seen: Rc<RefCell<Vec<View>>> = Rc::default();
    let sink = Rc::clone(&seen);

    let mut lb = Lightbox::default();
    let id = lb.subscribe(move |view| sink.borrow_mut().push(*view));
    lb.open_gallery(&car);
    lb.next_image();
    lb.zoom_in();

    {
        let views = seen.borrow();
        assert_eq!(views.len(), 3);
        assert!(views[0].open);
        assert_eq!(views[0].image_count, 2);
        assert_eq!(views[1].index, 1);
        assert!(approx_eq(views[2].zoom, 1.2));
    }

    assert!(lb.unsubscribe(id));
    assert!(!lb.unsubscribe(id));
    lb.zoom_in();
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn no_op_operations_do_not_notify() {
    let seen = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&seen);
    let mut lb = Lightbox::default();
    lb.subscribe(move |_| *sink.borrow_mut() += 1);
    lb.next_image();
    lb.begin_drag(Point::new(1.0, 1.0));
    lb.drag_to(Point::new(2.0, 2.0));
    lb.end_drag();
    lb.close_gallery();
    lb.handle_key(&Key::Escape);
    assert_eq!(*seen.borrow(), 0);
}
