use crate::smart_card::{Error, SmartCardReader};

pub struct SmartCardContext {
    pcsc_context: pcsc::Context,
}

impl SmartCardContext {
    pub(crate) fn get_pcsc_context(&self) -> &pcsc::Context {
        &self.pcsc_context
    }

    pub fn establish() -> Result<SmartCardContext, Error> {
        match pcsc::Context::establish(pcsc::Scope::User) {
            Ok(pcsc_context) => Ok(SmartCardContext { pcsc_context }),
            Err(err) => Err(Error::ContextInitFailed(format!(
                "Failed to initialize PCSC smart card context: {}",
                err
            ))),
        }
    }

    pub fn get_readers(&self) -> Result<impl Iterator<Item = SmartCardReader<'_>>, Error> {
        let reader_c_names = self
            .pcsc_context
            .list_readers_owned()
            .map_err(|err| {
                Error::ReaderListFailed(format!("Failed to get smart card readers: {}", err))
            })?
            .into_iter();

        let reader_names: Vec<String> = reader_c_names
            .map(|name| {
                let s = name.to_str().map_err(|err| {
                    Error::ReaderListFailed(format!(
                        "Failed to convert reader name to valid UTF-8 string: {}",
                        err
                    ))
                })?;
                Ok(s.to_owned())
            })
            .collect::<Result<_, Error>>()?;

        let readers = reader_names
            .into_iter()
            .map(|name| SmartCardReader::new(name, self));

        Ok(readers)
    }

    /// Picks the first reader whose name starts with `name_prefix`, or the first reader at all
    /// when no prefix is given.
    pub fn select_reader(&self, name_prefix: Option<&str>) -> Result<SmartCardReader<'_>, Error> {
        self.get_readers()?
            .find(|reader| matches_prefix(&reader.name, name_prefix))
            .ok_or_else(|| match name_prefix {
                Some(prefix) => {
                    Error::ReaderNotFound(format!("no reader name starts with \"{}\"", prefix))
                }
                None => Error::ReaderNotFound("no smart card readers connected".to_string()),
            })
    }
}

fn matches_prefix(name: &str, name_prefix: Option<&str>) -> bool {
    name_prefix.map_or(true, |prefix| name.starts_with(prefix))
}
