//! Built-in system host
//!
//! Exposes the local machine as reflectable types: operating system and
//! architecture constants, the current process, its environment, CPU
//! counts, the locale, a global settings provider, and a web-view style UI
//! type that must be scanned on the affinity thread. `host.Context` and
//! `host.ContentResolver` have no public constructor; they are seeded into
//! the instance cache before a scan.

use std::sync::Arc;

use hostprint_engine::InstanceFactory;
use hostprint_sdk::{HostResult, HostValue, TypeBuilder, TypeRef, TypeRegistry};

use crate::settings::{self, SettingsStore};

/// Application context
pub const CONTEXT: &str = "host.Context";

/// Settings resolver handed to key/value accessors
pub const CONTENT_RESOLVER: &str = "host.ContentResolver";

const BUILD: &str = "host.os.Build";
const PROCESS: &str = "host.os.Process";
const RUNTIME: &str = "host.Runtime";
const ENVIRONMENT: &str = "host.Environment";
const SETTINGS_GLOBAL: &str = "host.provider.Settings$Global";
const LOCALE: &str = "host.Locale";
const LOCALE_BUILDER: &str = "host.Locale$Builder";
const WEB_VIEW: &str = "host.ui.WebView";

const PACKAGE_NAME: &str = "hostprint";

/// Build the system host over a settings table
pub fn system_host(settings: Arc<SettingsStore>) -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();
    register_build(&registry);
    register_process(&registry);
    register_runtime(&registry);
    register_environment(&registry);
    register_context(&registry);
    register_settings(&registry, settings);
    register_locale(&registry);
    register_web_view(&registry);
    Arc::new(registry)
}

/// Seed the context and the content resolver. Returns how many instances
/// were seeded.
pub fn seed_services(factory: &mut InstanceFactory, registry: &TypeRegistry) -> HostResult<usize> {
    let resolver = registry.allocate(CONTENT_RESOLVER)?;
    let context = registry.allocate(CONTEXT)?;
    context.set("resolver", HostValue::Object(resolver.clone()))?;
    Ok(factory.seed_services([HostValue::Object(context), HostValue::Object(resolver)]))
}

fn list_type() -> TypeRef {
    TypeRef::named("host.util.List")
}

fn env_value(name: &str) -> HostValue {
    HostValue::opt_str(std::env::var(name).ok())
}

// ============================================================================
// Operating system
// ============================================================================

fn register_build(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(BUILD)
            .as_final()
            .constant("OS", TypeRef::Str, std::env::consts::OS)
            .constant("FAMILY", TypeRef::Str, std::env::consts::FAMILY)
            .constant("ARCH", TypeRef::Str, std::env::consts::ARCH)
            .constant("EXE_SUFFIX", TypeRef::Str, std::env::consts::EXE_SUFFIX)
            .constant("DLL_EXTENSION", TypeRef::Str, std::env::consts::DLL_EXTENSION)
            .constant("POINTER_WIDTH", TypeRef::int(), (std::mem::size_of::<usize>() * 8) as i32)
            .static_method("getSerial", vec![], TypeRef::Str, |_| {
                Err("serial number requires elevated privileges".into())
            })
            .static_method("getKernelRelease", vec![], TypeRef::Str, |_| {
                let release = std::fs::read_to_string("/proc/sys/kernel/osrelease")
                    .map_err(|e| e.to_string())?;
                Ok(HostValue::str(release.trim()))
            })
            .build(),
    );
}

fn register_process(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(PROCESS)
            .as_final()
            .static_method("getPid", vec![], TypeRef::long(), |_| {
                Ok(HostValue::Long(i64::from(std::process::id())))
            })
            .static_method("getExecutable", vec![], TypeRef::Str, |_| {
                let exe = std::env::current_exe().map_err(|e| e.to_string())?;
                Ok(HostValue::str(exe.display().to_string()))
            })
            .static_method("getWorkingDirectory", vec![], TypeRef::Str, |_| {
                let dir = std::env::current_dir().map_err(|e| e.to_string())?;
                Ok(HostValue::str(dir.display().to_string()))
            })
            .static_method("getArguments", vec![], list_type(), |_| {
                Ok(HostValue::list(std::env::args().map(HostValue::from).collect()))
            })
            .static_method("killProcess", vec![TypeRef::long()], TypeRef::Void, |_| {
                Err("refusing to signal processes".into())
            })
            .build(),
    );
}

fn register_runtime(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(RUNTIME)
            .constructor(vec![], |_| Ok(()))
            .method("getAvailableProcessors", vec![], TypeRef::int(), |_| {
                Ok(HostValue::Int(num_cpus::get() as i32))
            })
            .method("getPhysicalCores", vec![], TypeRef::int(), |_| {
                Ok(HostValue::Int(num_cpus::get_physical() as i32))
            })
            .method("gc", vec![], TypeRef::Void, |_| Ok(HostValue::Null))
            .build(),
    );
}

fn register_environment(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(ENVIRONMENT)
            .as_final()
            .static_method("getHomeDirectory", vec![], TypeRef::Str, |_| Ok(env_value("HOME")))
            .static_method("getUser", vec![], TypeRef::Str, |_| Ok(env_value("USER")))
            .static_method("getShell", vec![], TypeRef::Str, |_| Ok(env_value("SHELL")))
            .static_method("getTerminal", vec![], TypeRef::Str, |_| Ok(env_value("TERM")))
            .static_method("getTempDirectory", vec![], TypeRef::Str, |_| {
                Ok(HostValue::str(std::env::temp_dir().display().to_string()))
            })
            .static_method("getPathEntries", vec![], list_type(), |_| {
                let entries = std::env::var_os("PATH")
                    .map(|path| {
                        std::env::split_paths(&path)
                            .map(|p| HostValue::str(p.display().to_string()))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(HostValue::list(entries))
            })
            .build(),
    );
}

// ============================================================================
// Context and settings
// ============================================================================

fn register_context(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(CONTEXT)
            .hidden_field("resolver", TypeRef::named(CONTENT_RESOLVER))
            .hidden_constructor(vec![], |_| Ok(()))
            .method("getPackageName", vec![], TypeRef::Str, |_| Ok(HostValue::str(PACKAGE_NAME)))
            .method("getContentResolver", vec![], TypeRef::named(CONTENT_RESOLVER), |inv| {
                inv.this()?.get("resolver")
            })
            .display(|_| format!("Context[{}]", PACKAGE_NAME))
            .build(),
    );
    registry.register(
        TypeBuilder::class(CONTENT_RESOLVER)
            .as_abstract()
            .method("getAuthorities", vec![], list_type(), |_| {
                Ok(HostValue::list(vec![HostValue::str("settings")]))
            })
            .display(|_| "ContentResolver".to_string())
            .build(),
    );
}

fn register_settings(registry: &TypeRegistry, store: Arc<SettingsStore>) {
    registry.register(
        TypeBuilder::class(SETTINGS_GLOBAL)
            .as_static()
            .as_final()
            .constant("CONTENT_URI", TypeRef::Str, settings::SETTINGS_URI)
            .constant("ADB_ENABLED", TypeRef::Str, settings::ADB_ENABLED)
            .constant(
                "DEVELOPMENT_SETTINGS_ENABLED",
                TypeRef::Str,
                settings::DEVELOPMENT_SETTINGS_ENABLED,
            )
            .constant("DEVICE_NAME", TypeRef::Str, settings::DEVICE_NAME)
            .constant("TIME_ZONE", TypeRef::Str, settings::TIME_ZONE)
            .static_method(
                "getString",
                vec![TypeRef::named(CONTENT_RESOLVER), TypeRef::Str],
                TypeRef::Str,
                move |inv| {
                    if inv.arg(0)?.is_null() {
                        return Err("no content resolver".into());
                    }
                    let name = inv.arg_str(1)?;
                    Ok(HostValue::opt_str(store.get(name)))
                },
            )
            .build(),
    );
}

// ============================================================================
// Locale
// ============================================================================

/// Split a POSIX locale (`en_US.UTF-8`) into language and country
fn parse_locale(raw: &str) -> (String, String) {
    let name = raw.split(['.', '@']).next().unwrap_or_default();
    let mut parts = name.splitn(2, '_');
    let language = parts.next().unwrap_or_default().to_lowercase();
    let country = parts.next().unwrap_or_default().to_uppercase();
    (language, country)
}

fn register_locale(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(LOCALE)
            .as_final()
            .field("language", TypeRef::Str)
            .field("country", TypeRef::Str)
            .nested(LOCALE_BUILDER)
            .constructor(vec![TypeRef::Str, TypeRef::Str], |inv| {
                let this = inv.this()?;
                this.set("language", inv.arg_str(0)?)?;
                this.set("country", inv.arg_str(1)?)
            })
            .method("getLanguage", vec![], TypeRef::Str, |inv| inv.this()?.get("language"))
            .method("getCountry", vec![], TypeRef::Str, |inv| inv.this()?.get("country"))
            .method("toLanguageTag", vec![], TypeRef::Str, |inv| {
                let this = inv.this()?;
                let language = this.get("language")?;
                let country = this.get("country")?;
                Ok(match (language.as_str(), country.as_str()) {
                    (Some(l), Some(c)) if !c.is_empty() => HostValue::str(format!("{}-{}", l, c)),
                    (Some(l), _) => HostValue::str(l),
                    _ => HostValue::Null,
                })
            })
            .display(|obj| {
                let language = obj.get("language").ok().map(|v| v.to_string()).unwrap_or_default();
                let country = obj.get("country").ok().map(|v| v.to_string()).unwrap_or_default();
                format!("{}_{}", language, country)
            })
            .build(),
    );
    registry.register(
        TypeBuilder::class(LOCALE_BUILDER)
            .as_static()
            .constructor(vec![], |_| Ok(()))
            .method("build", vec![], TypeRef::named(LOCALE), |inv| {
                let raw = std::env::var("LC_ALL")
                    .or_else(|_| std::env::var("LANG"))
                    .unwrap_or_else(|_| "C".to_string());
                let (language, country) = parse_locale(&raw);
                let locale = inv.allocate(LOCALE)?;
                locale.set("language", language)?;
                locale.set("country", country)?;
                Ok(HostValue::Object(locale))
            })
            .build(),
    );
}

// ============================================================================
// UI
// ============================================================================

fn register_web_view(registry: &TypeRegistry) {
    registry.register(
        TypeBuilder::class(WEB_VIEW)
            .field("context", TypeRef::named(CONTEXT))
            .constructor(vec![TypeRef::named(CONTEXT)], |inv| {
                let context = inv.arg(0)?.clone();
                if context.is_null() {
                    return Err("a web view needs a context".into());
                }
                inv.this()?.set("context", context)
            })
            .method("getUserAgent", vec![], TypeRef::Str, |_| {
                Ok(HostValue::str(format!(
                    "{}/{} ({}; {})",
                    PACKAGE_NAME,
                    env!("CARGO_PKG_VERSION"),
                    std::env::consts::OS,
                    std::env::consts::ARCH
                )))
            })
            .method("getThreadName", vec![], TypeRef::Str, |_| {
                Ok(HostValue::opt_str(std::thread::current().name()))
            })
            .method("loadUrl", vec![TypeRef::Str], TypeRef::Void, |_| Ok(HostValue::Null))
            .build(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprint_sdk::Introspector;

    fn host() -> Arc<TypeRegistry> {
        system_host(Arc::new(SettingsStore::new().with(settings::ADB_ENABLED, "1")))
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(parse_locale("en_US.UTF-8"), ("en".to_string(), "US".to_string()));
        assert_eq!(parse_locale("de_DE@euro"), ("de".to_string(), "DE".to_string()));
        assert_eq!(parse_locale("C"), ("c".to_string(), String::new()));
    }

    #[test]
    fn test_every_type_resolves() {
        let host = host();
        assert_eq!(host.len(), 10);
        for name in host.type_names() {
            assert!(host.resolve(&name).is_ok(), "{} does not resolve", name);
        }
    }

    #[test]
    fn test_seed_services() {
        let host = host();
        let mut factory = InstanceFactory::new(host.clone());
        assert_eq!(seed_services(&mut factory, &host).unwrap(), 2);
        assert!(factory.context().is_cached(CONTEXT));
        assert!(factory.context().is_cached(CONTENT_RESOLVER));

        let web_view = factory.get_instance_by_name(WEB_VIEW).unwrap();
        let context = web_view.as_object().unwrap().get("context").unwrap();
        assert_eq!(context.as_object().unwrap().type_name(), CONTEXT);
    }

    #[test]
    fn test_settings_lookup() {
        let host = host();
        let desc = host.resolve(SETTINGS_GLOBAL).unwrap();
        let get_string = desc.declared_method("getString").unwrap();
        let resolver = HostValue::Object(host.allocate(CONTENT_RESOLVER).unwrap());

        let found = host
            .invoke_method(get_string, None, &[resolver.clone(), HostValue::str("adb_enabled")])
            .unwrap();
        assert_eq!(found.as_str(), Some("1"));

        let missing = host
            .invoke_method(get_string, None, &[resolver, HostValue::str("nope")])
            .unwrap();
        assert!(missing.is_null());

        assert!(host
            .invoke_method(get_string, None, &[HostValue::Null, HostValue::str("adb_enabled")])
            .is_err());
    }

    #[test]
    fn test_locale_builder_path() {
        let host = host();
        let mut factory = InstanceFactory::new(host);
        let locale = factory.get_instance_by_name(LOCALE).unwrap();
        assert_eq!(locale.as_object().unwrap().type_name(), LOCALE);
        assert!(factory.context().is_cached(LOCALE_BUILDER));
    }
}
