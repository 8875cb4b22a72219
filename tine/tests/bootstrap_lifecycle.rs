//! Lifecycle tests: init order, controller dispatch, the fatal path and
//! teardown.

use std::cell::RefCell;
use std::rc::Rc;

use tine::{Errors, Phase, Value};

mod common;
use common::{FailingController, RecordingController, app_for, app_with, get_source, loader};

#[test]
fn an_unroutable_segment_renders_the_catchall_404() {
    let (mut app, buffer) = app_for(get_source("/nowhere/"));
    app.execute("dev").unwrap();

    let output = buffer.contents();
    assert!(output.contains("HTTP/1.0 404 Not Found"), "got: {output}");
    assert!(output.contains("Fatal 404: Not Found"), "got: {output}");
    assert_eq!(app.phase(), Phase::ShutDown);
}

#[test]
fn a_status_specific_template_wins_over_the_catchall() {
    let loader = loader().with_template("errors/404", "Page not found");
    let (mut app, buffer) = app_with(loader, get_source("/nowhere/"));
    app.execute("dev").unwrap();

    let output = buffer.contents();
    assert!(output.contains("Page not found"), "got: {output}");
    assert!(!output.contains("Fatal 404"), "got: {output}");
}

#[test]
fn buffered_fatal_output_survives_until_the_shutdown_flush() {
    let (mut app, buffer) = app_for(get_source("/nowhere/"));
    app.init("dev").unwrap();
    app.registry().output().unwrap().buffer(None);

    app.run().unwrap();
    assert_eq!(buffer.contents(), "", "nothing may be written before the flush");

    app.shutdown();
    assert!(buffer.contents().contains("Fatal 404: Not Found"));
}

#[test]
fn rewritten_urls_dispatch_by_their_routed_segments() {
    let (mut app, _buffer) = app_for(get_source("/error/503/"));
    let segments = Rc::new(RefCell::new(Vec::new()));

    let seen = segments.clone();
    app.register_controller(
        "home",
        Box::new(move || Rc::new(RecordingController { segments: seen.clone() })),
    );
    app.execute("dev").unwrap();

    assert_eq!(*segments.borrow(), vec!["home", "fatal", "503"]);
}

#[test]
fn the_default_controller_serves_the_bare_root() {
    let (mut app, _buffer) = app_for(get_source("/"));
    let segments = Rc::new(RefCell::new(vec!["untouched".to_string()]));

    let seen = segments.clone();
    app.register_controller(
        "home",
        Box::new(move || Rc::new(RecordingController { segments: seen.clone() })),
    );
    app.execute("dev").unwrap();

    // dispatched (so the marker is gone), with no segments to record
    assert!(segments.borrow().is_empty());
}

#[test]
fn lifecycle_events_fire_in_order() {
    let (mut app, _buffer) = app_for(get_source("/home/"));
    let order = Rc::new(RefCell::new(Vec::new()));

    let event = app.registry().event().unwrap();
    for name in [
        "bootstrap.init.before",
        "bootstrap.init.after",
        "bootstrap.run.before",
        "bootstrap.run.after",
        "shutdown.run.before",
    ] {
        let seen = order.clone();
        event.listen(
            name,
            Rc::new(move |bound, _| {
                if let Some(tag) = bound.first().and_then(Value::as_str) {
                    seen.borrow_mut().push(tag.to_string());
                }
                Value::Null
            }),
            vec![Value::String(name.to_string())],
        );
    }

    let segments = Rc::new(RefCell::new(Vec::new()));
    let seen = segments.clone();
    app.register_controller(
        "home",
        Box::new(move || Rc::new(RecordingController { segments: seen.clone() })),
    );
    app.execute("dev").unwrap();

    assert_eq!(
        *order.borrow(),
        vec![
            "bootstrap.init.before",
            "bootstrap.init.after",
            "bootstrap.run.before",
            "bootstrap.run.after",
            "shutdown.run.before",
        ]
    );
}

#[test]
fn pre_registered_subsystems_are_not_rebuilt() {
    let (mut app, _buffer) = app_for(get_source("/nowhere/"));
    let errors = Rc::new(Errors::new(true));
    app.registry_mut().set_error(errors.clone());

    app.init("dev").unwrap();
    assert!(Rc::ptr_eq(&app.registry().error().unwrap(), &errors));
    assert_eq!(app.phase(), Phase::Initialized);
    // no controller has been dispatched yet
    assert!(app.registry().controller().is_err());
}

#[test]
fn shutdown_drops_everything_but_the_error_subsystem() {
    let (mut app, _buffer) = app_for(get_source("/nowhere/"));
    app.execute("dev").unwrap();

    assert!(app.registry().error().is_ok());
    assert!(app.registry().router().is_err());
    assert!(app.registry().output().is_err());
    assert!(app.registry().event().is_err());
    assert!(app.registry().config().is_err());
}

#[test]
fn controller_failures_render_through_the_fatal_path() {
    let (mut app, buffer) = app_for(get_source("/broken/"));
    app.register_controller(
        "broken",
        Box::new(|| Rc::new(FailingController { status: 503 })),
    );
    app.execute("dev").unwrap();

    let output = buffer.contents();
    assert!(output.contains("HTTP/1.0 503 Service Unavailable"), "got: {output}");
    assert!(output.contains("Fatal 503: Service Unavailable"), "got: {output}");

    // the failure was also collected by the retained error subsystem
    let messages = app.registry().error().unwrap().messages();
    assert!(messages.iter().any(|message| message.contains("controller gave up")));
}
