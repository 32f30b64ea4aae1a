pub mod book_information;

use bookinfo_db::DbPool;
use bookinfo_kernel::ModuleRegistry;

/// Register all service modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &DbPool) -> anyhow::Result<()> {
    registry.register(book_information::create_module(db.clone()))?;
    Ok(())
}
