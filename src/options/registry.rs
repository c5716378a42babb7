use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::BoxError;
use super::resolver::OptionsResolver;
use super::{ConfigureOptions, Stage};
use crate::config::ConfigSection;

pub(crate) type Recipe<T> = Box<dyn Fn(&mut T) -> Result<(), BoxError> + Send + Sync>;

/// The recipes registered for one options type, per stage.
pub(crate) struct RecipeList<T> {
    pub(crate) configure: Vec<Recipe<T>>,
    pub(crate) post_configure: Vec<Recipe<T>>,
}

impl<T: 'static> RecipeList<T> {
    fn with_recipe(stage: Stage, recipe: Recipe<T>) -> Self {
        let mut list = Self {
            configure: Vec::new(),
            post_configure: Vec::new(),
        };
        list.stage_mut(stage).push(recipe);
        list
    }

    fn len(&self) -> usize {
        self.configure.len() + self.post_configure.len()
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut Vec<Recipe<T>> {
        match stage {
            Stage::Configure => &mut self.configure,
            Stage::PostConfigure => &mut self.post_configure,
        }
    }
}

/// Type-erased home of a `RecipeList<T>`, keyed by `TypeId::of::<T>()`.
struct Slot {
    type_name: &'static str,
    len: usize,
    recipes: Box<dyn Any + Send + Sync>,
}

impl Slot {
    fn new<T: 'static>(list: RecipeList<T>) -> Self {
        Self {
            type_name: type_name::<T>(),
            len: list.len(),
            recipes: Box::new(list),
        }
    }
}

/// Startup-time store of configuration recipes, grouped by options type.
///
/// Registration takes `&mut self`; once wiring is done the registry is frozen
/// with [`into_resolver`](Self::into_resolver) and can no longer change.
///
/// ```
/// use dragon_options::OptionsRegistry;
///
/// #[derive(Default)]
/// struct WriterOptions {
///     message: String,
/// }
///
/// let mut registry = OptionsRegistry::new();
/// registry
///     .configure(|o: &mut WriterOptions| o.message = "Hello".into())
///     .configure(|o: &mut WriterOptions| o.message = "Hello world!".into());
///
/// let options: WriterOptions = registry.into_resolver().resolve()?;
/// assert_eq!(options.message, "Hello world!");
/// # Ok::<(), dragon_options::OptionsError>(())
/// ```
#[derive(Default)]
pub struct OptionsRegistry {
    slots: HashMap<TypeId, Slot>,
}

impl OptionsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fallible recipe for `T`. Duplicates are kept and all run.
    pub fn register<T, F, E>(&mut self, recipe: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&mut T) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.push(
            Stage::Configure,
            Box::new(move |options: &mut T| recipe(options).map_err(Into::into)),
        )
    }

    /// Appends an infallible recipe for `T`.
    pub fn configure<T, F>(&mut self, recipe: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.push(
            Stage::Configure,
            Box::new(move |options: &mut T| {
                recipe(options);
                Ok(())
            }),
        )
    }

    /// Registers a [`ConfigureOptions`] implementation for `T`.
    pub fn configure_options<T, C>(&mut self, configurer: C) -> &mut Self
    where
        T: 'static,
        C: ConfigureOptions<T>,
    {
        self.configure(move |options: &mut T| configurer.configure(options))
    }

    /// Appends a recipe that runs after every configure recipe of `T`,
    /// regardless of registration order.
    pub fn post_configure<T, F>(&mut self, recipe: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.push(
            Stage::PostConfigure,
            Box::new(move |options: &mut T| {
                recipe(options);
                Ok(())
            }),
        )
    }

    /// Registers a recipe that copies the keys of `section` onto `T`.
    ///
    /// See [`ConfigSection::bind_into`]. An empty section leaves `T` untouched.
    pub fn bind<T>(&mut self, section: ConfigSection) -> &mut Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        tracing::debug!(options = type_name::<T>(), section = %section.path(), "binding config section");
        self.register(move |options: &mut T| section.bind_into(options))
    }

    /// Number of recipes registered for `T`, across both stages.
    pub fn recipe_count<T: 'static>(&self) -> usize {
        self.slots.get(&TypeId::of::<T>()).map_or(0, |slot| slot.len)
    }

    /// Freezes the registry and hands it to a resolver.
    pub fn into_resolver(self) -> OptionsResolver {
        OptionsResolver::new(Arc::new(self))
    }

    pub(crate) fn recipes<T: 'static>(&self) -> Option<&RecipeList<T>> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.recipes.downcast_ref::<RecipeList<T>>())
    }

    fn push<T: 'static>(&mut self, stage: Stage, recipe: Recipe<T>) -> &mut Self {
        let slot = match self.slots.entry(TypeId::of::<T>()) {
            Entry::Vacant(vacant) => vacant.insert(Slot::new(RecipeList::with_recipe(stage, recipe))),
            Entry::Occupied(occupied) => {
                let slot = occupied.into_mut();
                match slot.recipes.downcast_mut::<RecipeList<T>>() {
                    Some(list) => {
                        list.stage_mut(stage).push(recipe);
                        slot.len = list.len();
                    }
                    // Keys are `TypeId::of::<T>()`, so only a `RecipeList<T>` is ever stored here.
                    None => *slot = Slot::new(RecipeList::with_recipe(stage, recipe)),
                }
                slot
            }
        };

        tracing::debug!(options = slot.type_name, %stage, count = slot.len, "registered options recipe");
        self
    }
}

impl fmt::Debug for OptionsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.values().map(|slot| (slot.type_name, slot.len)))
            .finish()
    }
}
