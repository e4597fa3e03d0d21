//! In-memory post form: field values, synchronous change notification, and
//! the title→slug deriver.
//!
//! A `PostForm` is single-threaded by construction (interior `Rc`/`RefCell`
//! state, deliberately not `Send`): one form instance lives on one UI thread
//! from mount to teardown. Watchers registered with [`PostForm::watch`] are
//! released deterministically — dropping the returned [`Subscription`]
//! deactivates the watcher, and tearing down the form drops whatever is left.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::mem;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::model::{Field, FormState, PostRecord};
use crate::slug::slugify_title;

/// Required-field checks performed by the form layer before submit runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
    #[error("a featured image is required for a new post")]
    ImageRequired,
}

/// The form's field values plus per-field validation marks. Watchers receive
/// a mutable handle so they can write derived fields; those writes do not
/// notify, which is what makes derivation non-recursive.
pub struct FormFields {
    values: FormState,
    validated: BTreeSet<Field>,
}

impl FormFields {
    pub fn values(&self) -> &FormState {
        &self.values
    }

    pub fn is_validated(&self, field: Field) -> bool {
        self.validated.contains(&field)
    }

    /// Write a derived text field and mark it validated, without notifying.
    pub fn set_derived(&mut self, field: Field, value: String) {
        match field {
            Field::Title => self.values.title = value,
            Field::Content => self.values.content = value,
            Field::Slug => self.values.slug = value,
            // The image field holds a path selection, not derived text.
            Field::Image => return,
        }
        self.validated.insert(field);
    }
}

type WatchFn = Box<dyn FnMut(Field, &mut FormFields)>;

struct Watcher {
    active: Rc<Cell<bool>>,
    callback: WatchFn,
}

/// RAII guard for a registered watcher. Dropping it deactivates the watcher;
/// the form prunes deactivated entries on the next notification.
#[must_use = "dropping the subscription detaches the watcher"]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.set(false);
    }
}

pub struct PostForm {
    fields: RefCell<FormFields>,
    watchers: Rc<RefCell<Vec<Watcher>>>,
}

impl PostForm {
    /// A fresh form for creating a post, or one seeded from the record being
    /// edited. The existing record is never mutated; submit produces a new
    /// version through the record store.
    pub fn new(existing: Option<&PostRecord>) -> Self {
        let values = match existing {
            Some(post) => FormState {
                title: post.title.clone(),
                content: post.content.clone(),
                slug: post.slug.clone(),
                image: None,
            },
            None => FormState::default(),
        };
        Self {
            fields: RefCell::new(FormFields {
                values,
                validated: BTreeSet::new(),
            }),
            watchers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a watcher for field-change notifications.
    ///
    /// Watchers run synchronously, in registration order, on every user edit.
    /// They receive the changed field and a mutable fields handle; writes
    /// through the handle do not re-notify. Watchers must not call back into
    /// the form's setters.
    pub fn watch(&self, callback: impl FnMut(Field, &mut FormFields) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        self.watchers.borrow_mut().push(Watcher {
            active: active.clone(),
            callback: Box::new(callback),
        });
        Subscription { active }
    }

    pub fn set_title(&self, value: impl Into<String>) {
        self.fields.borrow_mut().values.title = value.into();
        self.notify(Field::Title);
    }

    pub fn set_content(&self, value: impl Into<String>) {
        self.fields.borrow_mut().values.content = value.into();
        self.notify(Field::Content);
    }

    pub fn set_slug(&self, value: impl Into<String>) {
        self.fields.borrow_mut().values.slug = value.into();
        self.notify(Field::Slug);
    }

    pub fn set_image(&self, value: Option<PathBuf>) {
        self.fields.borrow_mut().values.image = value;
        self.notify(Field::Image);
    }

    /// Snapshot of the current values, for submit.
    pub fn values(&self) -> FormState {
        self.fields.borrow().values.clone()
    }

    pub fn is_validated(&self, field: Field) -> bool {
        self.fields.borrow().is_validated(field)
    }

    /// Required-field checks; run before submit, not part of reconciliation.
    pub fn validate_for_submit(
        &self,
        existing: Option<&PostRecord>,
    ) -> Result<(), ValidationError> {
        let fields = self.fields.borrow();
        if fields.values.title.trim().is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        if existing.is_none() && fields.values.image.is_none() {
            return Err(ValidationError::ImageRequired);
        }
        Ok(())
    }

    fn notify(&self, changed: Field) {
        // Take the watcher list out for the duration of the callbacks so a
        // watcher registered mid-notification lands in the shared list
        // instead of invalidating the iteration.
        let mut batch = mem::take(&mut *self.watchers.borrow_mut());
        {
            let mut fields = self.fields.borrow_mut();
            for watcher in batch.iter_mut() {
                if watcher.active.get() {
                    (watcher.callback)(changed, &mut fields);
                }
            }
        }
        batch.retain(|w| w.active.get());
        let mut watchers = self.watchers.borrow_mut();
        batch.extend(watchers.drain(..));
        *watchers = batch;
    }
}

/// Keep the slug field synchronized with the title.
///
/// The watcher recomputes the slug only when the changed field is the title;
/// edits to any other field — the slug itself included — leave it alone.
/// Hold the returned subscription for the lifetime of the form and drop it on
/// teardown.
pub fn attach_slug_deriver(form: &PostForm) -> Subscription {
    form.watch(|changed, fields| {
        if changed == Field::Title {
            let derived = slugify_title(&fields.values().title);
            fields.set_derived(Field::Slug, derived);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn dropped_subscription_deactivates_watcher() {
        let form = PostForm::new(None);
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let sub = form.watch(move |_, _| counter.set(counter.get() + 1));

        form.set_title("one");
        assert_eq!(seen.get(), 1);

        drop(sub);
        form.set_title("two");
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn derived_writes_do_not_renotify() {
        let form = PostForm::new(None);
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let _sub = form.watch(move |changed, fields| {
            counter.set(counter.get() + 1);
            if changed == Field::Title {
                fields.set_derived(Field::Slug, "derived".into());
            }
        });

        form.set_title("t");
        // One notification for the title edit, none for the derived write.
        assert_eq!(seen.get(), 1);
        assert_eq!(form.values().slug, "derived");
    }

    #[test]
    fn watcher_registered_during_notification_sees_later_events() {
        let form = Rc::new(PostForm::new(None));
        let late_seen = Rc::new(Cell::new(0));
        let registered = Rc::new(RefCell::new(Vec::new()));

        let form_ref = form.clone();
        let late_counter = late_seen.clone();
        let holder = registered.clone();
        let _sub = form.watch(move |_, _| {
            if holder.borrow().is_empty() {
                let counter = late_counter.clone();
                let sub = form_ref.watch(move |_, _| counter.set(counter.get() + 1));
                holder.borrow_mut().push(sub);
            }
        });

        form.set_content("first");
        assert_eq!(late_seen.get(), 0);
        form.set_content("second");
        assert_eq!(late_seen.get(), 1);
    }

    #[test]
    fn deriver_marks_slug_validated() {
        let form = PostForm::new(None);
        let _sub = attach_slug_deriver(&form);
        assert!(!form.is_validated(Field::Slug));

        form.set_title("A Title");
        assert!(form.is_validated(Field::Slug));
    }

    #[test]
    fn validate_for_submit_requires_title_and_image() {
        let form = PostForm::new(None);
        assert_eq!(
            form.validate_for_submit(None),
            Err(ValidationError::TitleRequired)
        );

        form.set_title("A Title");
        assert_eq!(
            form.validate_for_submit(None),
            Err(ValidationError::ImageRequired)
        );

        form.set_image(Some(PathBuf::from("cover.png")));
        assert_eq!(form.validate_for_submit(None), Ok(()));
    }
}
