use std::any::type_name;
use std::sync::Arc;

use super::registry::{OptionsRegistry, Recipe};
use super::{OptionsError, Stage};

/// Materializes configured options from a frozen [`OptionsRegistry`].
///
/// Cheap to clone and safe to share across threads: resolution only reads
/// the registry and builds a fresh instance owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct OptionsResolver {
    registry: Arc<OptionsRegistry>,
}

impl OptionsResolver {
    pub(crate) fn new(registry: Arc<OptionsRegistry>) -> Self {
        Self { registry }
    }

    /// Default-constructs `T`, then applies its configure recipes and its
    /// post-configure recipes, each in registration order.
    ///
    /// A type with no recipes resolves to `T::default()`. The first failing
    /// recipe aborts resolution and nothing is returned.
    pub fn resolve<T: Default + 'static>(&self) -> Result<T, OptionsError> {
        let mut options = T::default();

        let Some(list) = self.registry.recipes::<T>() else {
            tracing::debug!(options = type_name::<T>(), "no recipes registered, using defaults");
            return Ok(options);
        };

        apply(&list.configure, Stage::Configure, &mut options)?;
        apply(&list.post_configure, Stage::PostConfigure, &mut options)?;

        tracing::debug!(
            options = type_name::<T>(),
            recipes = list.configure.len() + list.post_configure.len(),
            "resolved options"
        );
        Ok(options)
    }

    pub fn registry(&self) -> &OptionsRegistry {
        &self.registry
    }
}

fn apply<T: 'static>(recipes: &[Recipe<T>], stage: Stage, options: &mut T) -> Result<(), OptionsError> {
    for (index, recipe) in recipes.iter().enumerate() {
        recipe(options).map_err(|source| {
            tracing::warn!(options = type_name::<T>(), %stage, index, error = %source, "options recipe failed");
            OptionsError::RecipeFailed {
                type_name: type_name::<T>(),
                stage,
                index,
                source,
            }
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BoxError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct WriterOptions {
        message: String,
        repeat: u32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct AppSettings {
        option: String,
    }

    #[test]
    fn test_unregistered_type_resolves_to_default() {
        let resolver = OptionsRegistry::new().into_resolver();

        assert_eq!(resolver.resolve::<WriterOptions>().unwrap(), WriterOptions::default());
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = OptionsRegistry::new();
        registry
            .configure(|o: &mut WriterOptions| o.message = "Hello".into())
            .configure(|o: &mut WriterOptions| o.message = "Hello world!".into());

        let options = registry.into_resolver().resolve::<WriterOptions>().unwrap();
        assert_eq!(options.message, "Hello world!");
    }

    #[test]
    fn test_order_is_observable() {
        let mut registry = OptionsRegistry::new();
        registry
            .configure(|o: &mut WriterOptions| o.repeat += 1)
            .configure(|o: &mut WriterOptions| o.repeat *= 10)
            .configure(|o: &mut WriterOptions| o.repeat += 2);

        let options = registry.into_resolver().resolve::<WriterOptions>().unwrap();
        assert_eq!(options.repeat, 12);
    }

    #[test]
    fn test_duplicate_recipes_all_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let recipe = move |o: &mut WriterOptions| {
            counter.fetch_add(1, Ordering::SeqCst);
            o.repeat += 1;
        };

        let mut registry = OptionsRegistry::new();
        registry.configure(recipe.clone()).configure(recipe);

        let options = registry.into_resolver().resolve::<WriterOptions>().unwrap();
        assert_eq!(options.repeat, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_global_settings_recipe() {
        let mut registry = OptionsRegistry::new();
        registry.configure(|o: &mut AppSettings| o.option = "Option from: Global".into());

        let settings = registry.into_resolver().resolve::<AppSettings>().unwrap();
        assert_eq!(settings.option, "Option from: Global");
    }

    #[test]
    fn test_types_are_isolated() {
        let mut registry = OptionsRegistry::new();
        registry.configure(|o: &mut WriterOptions| o.message = "writer".into());

        let resolver = registry.into_resolver();
        assert_eq!(resolver.registry().recipe_count::<AppSettings>(), 0);
        assert_eq!(resolver.resolve::<AppSettings>().unwrap(), AppSettings::default());
        assert_eq!(resolver.resolve::<WriterOptions>().unwrap().message, "writer");
    }

    #[test]
    fn test_post_configure_runs_last() {
        let mut registry = OptionsRegistry::new();
        registry
            .post_configure(|o: &mut WriterOptions| o.message.push_str(" (post)"))
            .configure(|o: &mut WriterOptions| o.message = "Hello".into());

        let options = registry.into_resolver().resolve::<WriterOptions>().unwrap();
        assert_eq!(options.message, "Hello (post)");
    }

    #[test]
    fn test_failing_recipe_aborts_resolution() {
        let mut registry = OptionsRegistry::new();
        registry
            .configure(|o: &mut WriterOptions| o.message = "Hello".into())
            .register(|_: &mut WriterOptions| Err::<(), BoxError>("message must not be empty".into()))
            .post_configure(|_: &mut WriterOptions| panic!("must not run after a failure"));

        let err = registry.into_resolver().resolve::<WriterOptions>().unwrap_err();
        match err {
            OptionsError::RecipeFailed {
                type_name,
                stage,
                index,
                source,
            } => {
                assert!(type_name.ends_with("WriterOptions"));
                assert_eq!(stage, Stage::Configure);
                assert_eq!(index, 1);
                assert_eq!(source.to_string(), "message must not be empty");
            }
        }
    }

    #[test]
    fn test_repeated_resolution_yields_independent_instances() {
        let mut registry = OptionsRegistry::new();
        registry.configure(|o: &mut WriterOptions| o.message = "Hello".into());
        let resolver = registry.into_resolver();

        let mut first = resolver.resolve::<WriterOptions>().unwrap();
        let second = resolver.resolve::<WriterOptions>().unwrap();
        assert_eq!(first, second);

        first.message.push('!');
        assert_eq!(resolver.resolve::<WriterOptions>().unwrap(), second);
    }

    #[test]
    fn test_concurrent_resolution() {
        let mut registry = OptionsRegistry::new();
        registry.configure(|o: &mut WriterOptions| o.repeat += 1);
        let resolver = registry.into_resolver();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| resolver.resolve::<WriterOptions>().unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().repeat, 1);
            }
        });
    }
}
