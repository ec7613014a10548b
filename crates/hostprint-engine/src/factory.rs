//! Instance factory
//!
//! Produces live instances of arbitrary host types. Outcomes are memoized
//! per type (a cached null means "failed, do not retry") and an in-flight
//! set stops a type from recursively constructing itself through its own
//! constructor arguments.
//!
//! Construction order for a type:
//! 1. a nested type whose simple name is `Builder`, finished through its
//!    public `build` method (approximate: any nested type named `Builder`
//!    qualifies)
//! 2. public constructors, all-primitive signatures first, then by arity

use std::sync::Arc;

use hostprint_sdk::{ConstructorInfo, HostValue, Introspector, TypeDescriptor, TypeRef};

use crate::config::ScanConfig;
use crate::context::ExplorationContext;
use crate::error::{ExplorationError, ExplorationResult};

const BUILDER_TYPE: &str = "Builder";
const BUILD_METHOD: &str = "build";

/// Memoizing instance factory for one pass
pub struct InstanceFactory {
    host: Arc<dyn Introspector>,
    denied_types: Vec<String>,
    pub(crate) context: ExplorationContext,
}

impl InstanceFactory {
    /// Create a factory with the default type denylist
    pub fn new(host: Arc<dyn Introspector>) -> Self {
        Self::with_denied_types(host, ScanConfig::default().denied_types)
    }

    /// Create a factory using the denylist from a configuration
    pub fn from_config(host: Arc<dyn Introspector>, config: &ScanConfig) -> Self {
        Self::with_denied_types(host, config.denied_types.clone())
    }

    /// Create a factory with an explicit denylist of type-name substrings
    pub fn with_denied_types(host: Arc<dyn Introspector>, denied_types: Vec<String>) -> Self {
        Self {
            host,
            denied_types,
            context: ExplorationContext::new(),
        }
    }

    /// The introspector this factory constructs through
    pub fn introspector(&self) -> &Arc<dyn Introspector> {
        &self.host
    }

    /// Cache and in-flight state
    pub fn context(&self) -> &ExplorationContext {
        &self.context
    }

    /// Register a well-known instance before scanning
    pub fn seed(&mut self, type_name: impl Into<String>, instance: HostValue) {
        self.context.cache(type_name, Some(instance));
    }

    /// Register service objects under the type name the host reports for
    /// each. Values without a descriptor are skipped. Returns how many were
    /// registered.
    pub fn seed_services(&mut self, services: impl IntoIterator<Item = HostValue>) -> usize {
        let mut seeded = 0;
        for service in services {
            match self.host.type_of(&service) {
                Ok(desc) => {
                    self.context.cache(desc.name.clone(), Some(service));
                    seeded += 1;
                }
                Err(e) => tracing::warn!(error = %e, "skipping service without a type"),
            }
        }
        seeded
    }

    /// Instance for a type, from the cache or freshly constructed
    pub fn get_instance(&mut self, desc: &TypeDescriptor) -> Option<HostValue> {
        if let Some(cached) = self.context.cached(&desc.name) {
            return cached.clone();
        }
        self.create_instance(desc)
    }

    /// Instance for a type name. Unknown types are cached as null.
    pub fn get_instance_by_name(&mut self, type_name: &str) -> Option<HostValue> {
        if let Some(cached) = self.context.cached(type_name) {
            return cached.clone();
        }
        match self.host.resolve(type_name) {
            Ok(desc) => self.create_instance(&desc),
            Err(e) => {
                tracing::debug!(type_name, error = %e, "cannot resolve type");
                self.context.cache(type_name, None);
                None
            }
        }
    }

    /// Attempt to construct a type, bypassing the cache lookup.
    ///
    /// Rejected types return null without touching any state. Otherwise the
    /// outcome is cached and the in-flight marker cleared before returning.
    pub fn create_instance(&mut self, desc: &TypeDescriptor) -> Option<HostValue> {
        if self.is_denied(&desc.name) {
            tracing::debug!(type_name = %desc.name, "type is denylisted");
            return None;
        }
        if !is_instantiable(desc) {
            tracing::debug!(type_name = %desc.name, "type is not instantiable");
            return None;
        }
        if !self.context.begin(&desc.name) {
            tracing::debug!(type_name = %desc.name, "type is already being constructed");
            return None;
        }

        let mut instance = None;
        if let Some(builder) = desc.nested_type_named(BUILDER_TYPE) {
            match self.build_with_builder(builder) {
                Ok(built) => instance = Some(built),
                Err(e) => {
                    tracing::debug!(type_name = %desc.name, builder, error = %e, "builder failed")
                }
            }
        }
        if instance.is_none() {
            instance = self.construct(desc);
        }

        self.context.cache(desc.name.clone(), instance.clone());
        self.context.finish(&desc.name);
        instance
    }

    /// Whether a type name matches the denylist
    pub fn is_denied(&self, type_name: &str) -> bool {
        self.denied_types.iter().any(|d| type_name.contains(d.as_str()))
    }

    fn build_with_builder(&mut self, builder_name: &str) -> ExplorationResult<HostValue> {
        let builder = self.host.resolve(builder_name)?;
        let receiver = self.get_instance(&builder);
        let build = builder
            .public_method(BUILD_METHOD)
            .ok_or_else(|| ExplorationError::Instantiation(format!("{} has no build()", builder_name)))?;
        if !build.is_static() && receiver.is_none() {
            return Err(ExplorationError::Instantiation(builder_name.to_string()));
        }
        let args = self.default_parameters(&build.parameters);
        let receiver = if build.is_static() { None } else { receiver };
        let built = self.host.invoke_method(build, receiver.as_ref(), &args)?;
        if built.is_null() {
            return Err(ExplorationError::Instantiation(format!("{}.build() returned null", builder_name)));
        }
        Ok(built)
    }

    fn construct(&mut self, desc: &TypeDescriptor) -> Option<HostValue> {
        for ctor in sorted_constructors(desc) {
            let args = self.default_parameters(&ctor.parameters);
            match self.host.invoke_constructor(ctor, &args) {
                Ok(instance) if !instance.is_null() => return Some(instance),
                Ok(_) => {}
                Err(e) => tracing::debug!(
                    type_name = %desc.name,
                    arity = ctor.parameters.len(),
                    error = %e,
                    "constructor failed"
                ),
            }
        }
        tracing::warn!(type_name = %desc.name, "no constructor succeeded");
        None
    }
}

/// Interfaces, enums, annotations, synthetic, anonymous, abstract and
/// static-only types are never constructed
fn is_instantiable(desc: &TypeDescriptor) -> bool {
    let m = &desc.modifiers;
    !(m.is_interface
        || m.is_enum
        || m.is_annotation
        || m.is_synthetic
        || m.is_anonymous
        || m.is_abstract
        || m.is_static)
}

/// Public constructors in attempt order: all-primitive signatures first,
/// then fewest parameters
pub fn sorted_constructors(desc: &TypeDescriptor) -> Vec<&ConstructorInfo> {
    let mut ctors: Vec<&ConstructorInfo> = desc.public_constructors().collect();
    ctors.sort_by_key(|c| (!c.parameters.iter().all(TypeRef::is_primitive_or_wrapper), c.parameters.len()));
    ctors
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprint_sdk::{TypeBuilder, TypeRegistry};

    fn factory(registry: TypeRegistry) -> InstanceFactory {
        InstanceFactory::with_denied_types(Arc::new(registry), vec!["pkg.Crashy".to_string()])
    }

    #[test]
    fn test_constructor_order() {
        let def = TypeBuilder::class("pkg.Multi")
            .constructor(vec![TypeRef::named("pkg.Other")], |_| Ok(()))
            .constructor(vec![TypeRef::int(), TypeRef::long()], |_| Ok(()))
            .constructor(vec![TypeRef::Str], |_| Ok(()))
            .constructor(vec![], |_| Ok(()))
            .hidden_constructor(vec![], |_| Ok(()))
            .build();
        let desc = def.descriptor();
        let order: Vec<usize> = sorted_constructors(desc).iter().map(|c| c.index).collect();
        assert_eq!(order, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_cached_null_is_not_retried() {
        let registry = TypeRegistry::new();
        registry.register(
            TypeBuilder::class("pkg.Broken")
                .constructor(vec![], |_| Err("nope".into()))
                .build(),
        );
        let mut factory = factory(registry);
        let desc = factory.introspector().resolve("pkg.Broken").unwrap();

        assert!(factory.get_instance(&desc).is_none());
        assert!(matches!(factory.context().cached("pkg.Broken"), Some(None)));
        assert!(factory.get_instance(&desc).is_none());
        assert_eq!(factory.context().in_flight_len(), 0);
    }

    #[test]
    fn test_denied_and_abstract_types_leave_no_state() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::class("pkg.Crashy$Inner").constructor(vec![], |_| Ok(())).build());
        registry.register(TypeBuilder::class("pkg.Shape").as_abstract().build());
        registry.register(TypeBuilder::class("pkg.Listener").as_interface().build());
        registry.register(TypeBuilder::class("pkg.Holder").as_static().build());
        let mut factory = factory(registry);

        for name in ["pkg.Crashy$Inner", "pkg.Shape", "pkg.Listener", "pkg.Holder"] {
            let desc = factory.introspector().resolve(name).unwrap();
            assert!(factory.create_instance(&desc).is_none(), "{} should be rejected", name);
        }
        assert_eq!(factory.context().in_flight_len(), 0);
        assert_eq!(factory.context().cache_len(), 0);
    }

    #[test]
    fn test_seed_short_circuits_construction() {
        let registry = TypeRegistry::new();
        registry.register(TypeBuilder::class("host.Context").build());
        let mut factory = factory(registry);
        let context = HostValue::str("app-context");
        factory.seed("host.Context", context);

        let found = factory.get_instance_by_name("host.Context").unwrap();
        assert_eq!(found.as_str(), Some("app-context"));
    }

    #[test]
    fn test_seed_services_by_runtime_type() {
        let registry = Arc::new(TypeRegistry::new());
        registry.register(TypeBuilder::class("host.PowerManager").build());
        let service = HostValue::Object(registry.allocate("host.PowerManager").unwrap());
        let mut factory = InstanceFactory::new(registry.clone());

        assert_eq!(factory.seed_services(vec![service.clone(), HostValue::Int(1)]), 1);
        let found = factory.get_instance_by_name("host.PowerManager").unwrap();
        assert!(found.as_object().unwrap().ptr_eq(service.as_object().unwrap()));
    }

    #[test]
    fn test_unknown_type_cached_as_null() {
        let mut factory = factory(TypeRegistry::new());
        assert!(factory.get_instance_by_name("pkg.Missing").is_none());
        assert!(factory.context().is_cached("pkg.Missing"));
    }
}
