use dashmap::DashMap;
use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AtaKey {
    owner: Pubkey,
    mint: Pubkey,
}

static ATA_CACHE: Lazy<DashMap<AtaKey, Pubkey>> = Lazy::new(DashMap::new);

/// SPL Token 程序下的 ATA 地址。地址是 (owner, mint) 的纯函数，缓存只省去 PDA 查找。
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    let key = AtaKey {
        owner: *owner,
        mint: *mint,
    };
    if let Some(entry) = ATA_CACHE.get(&key) {
        return *entry;
    }
    let address = spl_associated_token_account::get_associated_token_address(owner, mint);
    ATA_CACHE.insert(key, address);
    address
}
