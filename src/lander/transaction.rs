use anyhow::{Result, anyhow};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::VersionedMessage;
use solana_sdk::message::v0::Message as V0Message;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;

/// 以 `signer` 为 fee payer 编译 v0 消息并签名；不使用地址查找表。
pub fn compile_transaction(
    instructions: &[Instruction],
    signer: &Keypair,
    blockhash: Hash,
) -> Result<VersionedTransaction> {
    if instructions.is_empty() {
        return Err(anyhow!("指令列表为空"));
    }
    let message = V0Message::try_compile(&signer.pubkey(), instructions, &[], blockhash)
        .map_err(|err| anyhow!("编译 v0 消息失败: {err}"))?;
    VersionedTransaction::try_new(VersionedMessage::V0(message), &[signer])
        .map_err(|err| anyhow!("签名交易失败: {err}"))
}

#[cfg(test)]
mod tests {
    use solana_sdk::pubkey::Pubkey;
    use solana_system_interface::instruction as system_instruction;

    use super::*;

    #[test]
    fn signs_with_payer_and_keeps_blockhash() {
        let signer = Keypair::new();
        let blockhash = Hash::new_unique();
        let ix = system_instruction::transfer(&signer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = compile_transaction(&[ix], &signer, blockhash).expect("compile");

        assert_eq!(tx.signatures.len(), 1);
        assert_eq!(*tx.message.recent_blockhash(), blockhash);
        assert_eq!(tx.message.static_account_keys()[0], signer.pubkey());
        assert!(tx.verify_with_results().iter().all(|ok| *ok));
    }

    #[test]
    fn empty_instruction_list_is_rejected() {
        let err = compile_transaction(&[], &Keypair::new(), Hash::new_unique()).unwrap_err();
        assert!(err.to_string().contains("为空"));
    }
}
