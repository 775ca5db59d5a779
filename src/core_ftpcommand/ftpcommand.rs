#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    AUTH,
    USER,
    PASS,
    SYST,
    FEAT,
    OPTS,
    HELP,
    NOOP,
    QUIT,
    PWD,
    CWD,
    CDUP,
    REST,
    TYPE,
    MODE,
    STRU,
    PBSZ,
    PROT,
    PASV,
    EPSV,
    PORT,
    EPRT,
    ABOR,
    MLSD,
    MLST,
    STAT,
    SIZE,
    STOR,
    APPE,
    MDTM,
    RETR,
    DELE,
    MKD,
    RMD,
    RNFR,
    RNTO,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "AUTH" => Some(FtpCommand::AUTH),
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "OPTS" => Some(FtpCommand::OPTS),
            "HELP" => Some(FtpCommand::HELP),
            "NOOP" => Some(FtpCommand::NOOP),
            "QUIT" => Some(FtpCommand::QUIT),
            "PWD" => Some(FtpCommand::PWD),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "REST" => Some(FtpCommand::REST),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "STRU" => Some(FtpCommand::STRU),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "PORT" => Some(FtpCommand::PORT),
            "EPRT" => Some(FtpCommand::EPRT),
            "ABOR" => Some(FtpCommand::ABOR),
            "MLSD" => Some(FtpCommand::MLSD),
            "MLST" => Some(FtpCommand::MLST),
            "STAT" => Some(FtpCommand::STAT),
            "SIZE" => Some(FtpCommand::SIZE),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "MDTM" => Some(FtpCommand::MDTM),
            "RETR" => Some(FtpCommand::RETR),
            "DELE" => Some(FtpCommand::DELE),
            "MKD" => Some(FtpCommand::MKD),
            "RMD" => Some(FtpCommand::RMD),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            _ => None,
        }
    }

    /// Commands allowed before authentication.
    pub fn is_pre_auth(&self) -> bool {
        matches!(
            self,
            FtpCommand::AUTH
                | FtpCommand::USER
                | FtpCommand::PASS
                | FtpCommand::SYST
                | FtpCommand::FEAT
                | FtpCommand::OPTS
                | FtpCommand::HELP
                | FtpCommand::NOOP
                | FtpCommand::QUIT
        )
    }

    /// Every recognized command name, echoed by HELP.
    pub fn all_names() -> &'static [&'static str] {
        &[
            "AUTH", "USER", "PASS", "SYST", "FEAT", "OPTS", "HELP", "NOOP", "QUIT", "PWD", "CWD",
            "CDUP", "REST", "TYPE", "MODE", "STRU", "PBSZ", "PROT", "PASV", "EPSV", "PORT",
            "EPRT", "ABOR", "MLSD", "MLST", "STAT", "SIZE", "STOR", "APPE", "MDTM", "RETR",
            "DELE", "MKD", "RMD", "RNFR", "RNTO",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(FtpCommand::from_str("stor"), Some(FtpCommand::STOR));
        assert_eq!(FtpCommand::from_str("Feat"), Some(FtpCommand::FEAT));
        assert_eq!(FtpCommand::from_str("NOSUCH"), None);
    }

    #[test]
    fn auth_commands_are_pre_auth_only() {
        assert!(FtpCommand::USER.is_pre_auth());
        assert!(FtpCommand::QUIT.is_pre_auth());
        assert!(!FtpCommand::STOR.is_pre_auth());
        assert!(!FtpCommand::PASV.is_pre_auth());
    }
}
