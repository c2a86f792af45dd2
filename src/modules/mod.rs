pub mod books;

use bookshelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: books::SharedBookStore) {
    registry.register_custom(books::create_module(store));
}
